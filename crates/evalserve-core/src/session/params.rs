//! Extra eval parameter parsing

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{SessionError, SessionResult};

/// A coerced parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Integer if it parses as one, else float, else the raw string
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return ParamValue::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return ParamValue::Float(value);
        }
        ParamValue::Str(raw.to_string())
    }

    /// JSON form; non-finite floats become null
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Int(value) => Value::from(*value),
            ParamValue::Float(value) => Value::from(*value),
            ParamValue::Str(value) => Value::String(value.clone()),
        }
    }
}

/// Parsed extra parameters, keyed by name
pub type ExtraEvalParams = BTreeMap<String, ParamValue>;

/// Parse comma-separated `key=value` tokens
///
/// Each token must contain exactly one `=`. An empty or blank string yields
/// no parameters. Later duplicates win.
pub fn parse_extra_eval_params(raw: &str) -> SessionResult<ExtraEvalParams> {
    let mut params = ExtraEvalParams::new();
    if raw.trim().is_empty() {
        return Ok(params);
    }

    for token in raw.split(',').map(str::trim) {
        let mut parts = token.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SessionError::ParameterSyntax {
                token: token.to_string(),
            });
        };
        params.insert(key.to_string(), ParamValue::coerce(value));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion() {
        let params = parse_extra_eval_params("a=1,b=2.5,c=hello").unwrap();
        assert_eq!(params["a"], ParamValue::Int(1));
        assert_eq!(params["b"], ParamValue::Float(2.5));
        assert_eq!(params["c"], ParamValue::Str("hello".to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_extra_eval_params("").unwrap().is_empty());
        assert!(parse_extra_eval_params("   ").unwrap().is_empty());
    }

    #[test]
    fn test_token_without_equals() {
        let err = parse_extra_eval_params("a=1,novalue").unwrap_err();
        match err {
            SessionError::ParameterSyntax { token } => assert_eq!(token, "novalue"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_comma_is_an_empty_token() {
        assert!(matches!(
            parse_extra_eval_params("a=1,"),
            Err(SessionError::ParameterSyntax { .. })
        ));
    }

    #[test]
    fn test_token_with_two_equals() {
        assert!(matches!(
            parse_extra_eval_params("a=b=c"),
            Err(SessionError::ParameterSyntax { .. })
        ));
    }

    #[test]
    fn test_empty_key_and_value() {
        let params = parse_extra_eval_params("=x, k=").unwrap();
        assert_eq!(params[""], ParamValue::Str("x".to_string()));
        assert_eq!(params["k"], ParamValue::Str(String::new()));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let params = parse_extra_eval_params("n=1,n=2").unwrap();
        assert_eq!(params["n"], ParamValue::Int(2));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(ParamValue::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(ParamValue::Float(0.5).to_json(), serde_json::json!(0.5));
        assert_eq!(ParamValue::Float(f64::NAN).to_json(), Value::Null);
        assert_eq!(
            ParamValue::Str("x".to_string()).to_json(),
            serde_json::json!("x")
        );
    }
}
