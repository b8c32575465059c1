use serde_json::Value;
use tracing::warn;

use super::Report;

/// Drop top-level entries whose value is NaN
///
/// Other entries are kept unchanged, in order. Infinities and nested NaN
/// values are left alone; [`wire_response`] handles those.
pub fn sanitize(report: &Report) -> Report {
    report
        .iter()
        .filter(|(_, value)| !value.is_nan())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// JSON body for a report returned to a caller
///
/// The sanitized report when it serializes, otherwise the diagnostic string
/// `RESULT: <raw report>`. An infinite metric always takes the fallback.
pub fn wire_response(report: &Report) -> Value {
    match sanitize(report).to_json() {
        Ok(value) => value,
        Err(e) => {
            warn!("Report could not be serialized: {}", e);
            Value::String(format!("RESULT: {report}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::report::MetricValue;
    use serde_json::json;

    #[test]
    fn test_sanitize_drops_nan() {
        let report = Report::new()
            .with("accuracy", 1.0)
            .with("bootstrap_std", f64::NAN);
        let clean = sanitize(&report);

        assert_eq!(clean, Report::new().with("accuracy", 1.0));
    }

    #[test]
    fn test_sanitize_keeps_infinities() {
        let report = Report::new().with("a", 1.0).with("big", f64::INFINITY);
        assert_eq!(sanitize(&report), report);
        assert_eq!(
            wire_response(&report),
            json!("RESULT: {'a': 1.0, 'big': inf}")
        );
    }

    #[test]
    fn test_sanitize_keeps_clean_report() {
        let report = Report::new().with("accuracy", 0.0).with("name", "x");
        assert_eq!(sanitize(&report), report);
        assert!(sanitize(&Report::new()).is_empty());
    }

    #[test]
    fn test_wire_response_map() {
        let report = Report::new()
            .with("accuracy", 1.0)
            .with("bootstrap_std", f64::NAN);
        assert_eq!(wire_response(&report), json!({"accuracy": 1.0}));
    }

    #[test]
    fn test_wire_response_falls_back_to_string() {
        let mut nested = BTreeMap::new();
        nested.insert("x".to_string(), MetricValue::Float(f64::NAN));
        let report = Report::new().with("nested", MetricValue::Map(nested));

        assert_eq!(
            wire_response(&report),
            json!("RESULT: {'nested': {'x': nan}}")
        );
    }
}
