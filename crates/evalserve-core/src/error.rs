//! Error types for eval sessions

use std::path::PathBuf;

use thiserror::Error;

use crate::completion::CompletionError;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while setting up or driving an eval session
///
/// Every variant is fatal to the session it occurs in. Nothing in the
/// session layer retries.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The requested eval is not in the registry
    #[error("Eval {name} not found. Available: {available:?}")]
    EvalNotFound {
        name: String,
        /// Every registered eval name, sorted ascending
        available: Vec<String>,
    },

    /// A token in `extra_eval_params` is not of the form `key=value`
    #[error("Invalid extra_eval_params token '{token}': expected key=value")]
    ParameterSyntax { token: String },

    /// The resolved eval key lacks the `<base>.<split>` structure
    #[error("Eval name '{0}' must have the form <base>.<split>")]
    MalformedEvalName(String),

    /// The eval class rejected the supplied configuration
    #[error("Failed to construct eval {eval}: {message}")]
    EvalConstruction { eval: String, message: String },

    /// Failure inside an eval's grading logic, passed through unchanged
    #[error(transparent)]
    Grading(#[from] GradingError),

    /// Registry files or sample data could not be loaded
    #[error("Registry error: {message}")]
    Registry {
        message: String,
        path: Option<PathBuf>,
    },

    /// A report holds values the wire format cannot represent
    #[error("Report serialization failed: {0}")]
    Serialization(String),

    /// The recorder could not write its log file
    #[error("Recorder I/O error: {0}")]
    Recorder(#[from] std::io::Error),
}

impl SessionError {
    /// Create a registry error without a path
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
            path: None,
        }
    }

    /// Create a registry error for a specific file
    pub fn registry_at(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Registry {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a construction error for the named eval
    pub fn construction(eval: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EvalConstruction {
            eval: eval.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while grading a single sample
#[derive(Error, Debug)]
pub enum GradingError {
    /// The completion function failed
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    /// The sample lacks a field the eval needs
    #[error("Sample {sample_id} is missing field '{field}'")]
    MissingField { sample_id: String, field: String },

    /// A sample field has the wrong shape
    #[error("Sample {sample_id} has invalid field '{field}': {message}")]
    InvalidField {
        sample_id: String,
        field: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available_names() {
        let err = SessionError::EvalNotFound {
            name: "nope".to_string(),
            available: vec!["a.b".to_string(), "c.d".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"Eval nope not found. Available: ["a.b", "c.d"]"#
        );
    }

    #[test]
    fn test_grading_error_is_transparent() {
        let err: SessionError = GradingError::MissingField {
            sample_id: "test.s1.0".to_string(),
            field: "input".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Sample test.s1.0 is missing field 'input'");
    }
}
