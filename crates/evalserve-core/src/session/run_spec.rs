//! Run provenance

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::error::{SessionError, SessionResult};
use crate::registry::EvalSpec;

/// Name the session's completion function is registered under
pub const COMPLETION_FN_NAME: &str = "unweave";

const RUN_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const RUN_ID_SUFFIX_LEN: usize = 8;

/// Settings in effect when the run started
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialSettings {
    pub visible: bool,
}

/// How a run was configured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDescriptor {
    pub completion_fns: Vec<String>,
    pub eval_spec: EvalSpec,
    pub seed: u64,
    pub max_samples: Option<usize>,
    /// Command line of the current process
    pub command: String,
    pub initial_settings: InitialSettings,
}

impl RunDescriptor {
    pub fn new(eval_spec: EvalSpec, seed: u64, max_samples: Option<usize>, visible: bool) -> Self {
        Self {
            completion_fns: vec![COMPLETION_FN_NAME.to_string()],
            eval_spec,
            seed,
            max_samples,
            command: shell_words::join(std::env::args()),
            initial_settings: InitialSettings { visible },
        }
    }
}

/// Identity of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSpec {
    pub completion_fns: Vec<String>,
    pub eval_name: String,
    pub base_eval: String,
    pub split: String,
    pub run_config: RunDescriptor,
    pub created_by: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

impl RunSpec {
    /// Derive the run identity from its descriptor
    ///
    /// Fails when the eval key has no `<base>.<split>` structure.
    pub fn new(descriptor: RunDescriptor, created_by: &str) -> SessionResult<Self> {
        let eval_name = descriptor.eval_spec.key.clone();
        let mut parts = eval_name.split('.');
        let (Some(base_eval), Some(split)) = (parts.next(), parts.next()) else {
            return Err(SessionError::MalformedEvalName(descriptor.eval_spec.key.clone()));
        };
        let (base_eval, split) = (base_eval.to_string(), split.to_string());

        let created_at = Utc::now();
        Ok(Self {
            completion_fns: descriptor.completion_fns.clone(),
            run_id: make_run_id(created_at),
            eval_name,
            base_eval,
            split,
            run_config: descriptor,
            created_by: created_by.to_string(),
            created_at,
        })
    }
}

/// Timestamp `%y%m%d%H%M%S` followed by random `[A-Z0-9]` characters
fn make_run_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..RUN_ID_SUFFIX_LEN)
        .map(|_| RUN_ID_ALPHABET[rng.random_range(0..RUN_ID_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", now.format("%y%m%d%H%M%S"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn spec(key: &str) -> EvalSpec {
        EvalSpec {
            key: key.to_string(),
            class: "match".to_string(),
            args: Map::new(),
            description: None,
            metrics: vec![],
            registry_path: None,
        }
    }

    #[test]
    fn test_run_spec_splits_name() {
        let descriptor = RunDescriptor::new(spec("test-match.s1.simple-v0"), 1, Some(2), false);
        let run_spec = RunSpec::new(descriptor, "alice").unwrap();

        assert_eq!(run_spec.base_eval, "test-match");
        assert_eq!(run_spec.split, "s1");
        assert_eq!(run_spec.created_by, "alice");
        assert_eq!(run_spec.completion_fns, vec!["unweave".to_string()]);
        assert_eq!(run_spec.run_config.max_samples, Some(2));
    }

    #[test]
    fn test_malformed_name() {
        let descriptor = RunDescriptor::new(spec("nodots"), 1, None, true);
        let err = RunSpec::new(descriptor, "").unwrap_err();
        assert!(matches!(err, SessionError::MalformedEvalName(name) if name == "nodots"));
    }

    #[test]
    fn test_run_id_format() {
        let id = make_run_id(Utc::now());
        assert_eq!(id.len(), 12 + RUN_ID_SUFFIX_LEN);
        assert!(id[..12].chars().all(|c| c.is_ascii_digit()));
        assert!(
            id[12..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }
}
