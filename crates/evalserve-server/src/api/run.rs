//! Single-sample grading

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use evalserve_core::{Sample, evaluate_sample, wire_response};
use serde_json::Value;

use super::{ApiError, ApiState};

/// Header naming the model endpoint the caller wants graded
pub const TARGET_ENDPOINT_HEADER: &str = "x-unweave-target-endpoint-url";

/// `POST /run`
///
/// The body is the sample itself plus an `"eval"` field, either flat or
/// wrapped as `{"request": {...}}`.
pub async fn run_sample(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let target = headers
        .get(TARGET_ENDPOINT_HEADER)
        .and_then(|value| value.to_str().ok());
    match target {
        Some(target) => tracing::info!("Target endpoint: {}", target),
        None => tracing::debug!("No target endpoint supplied"),
    }

    let (eval, sample) = parse_request(&body)?;
    tracing::info!("Running eval {} on one sample", eval);

    let args = state.session_args(&eval);
    let report = evaluate_sample(
        &args,
        state.completion_fn(target),
        sample,
        Some(state.session_registry()),
    )
    .await?;

    Ok(Json(wire_response(&report)))
}

/// Split a request body into the eval name and the sample to grade
fn parse_request(body: &[u8]) -> Result<(String, Sample), ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("body is not valid JSON: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(ApiError::BadRequest("body must be a JSON object".to_string()));
    };

    if fields.len() == 1 && matches!(fields.get("request"), Some(Value::Object(_))) {
        if let Some(Value::Object(inner)) = fields.remove("request") {
            fields = inner;
        }
    }

    let eval = match fields.remove("eval") {
        Some(Value::String(name)) => name,
        Some(other) => other.to_string(),
        None => return Err(ApiError::BadRequest("missing field 'eval'".to_string())),
    };

    Ok((eval, Sample::new(fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_flat_request() {
        let body = json!({"eval": "test-match", "input": "hi", "ideal": "there"});
        let (eval, sample) = parse_request(body.to_string().as_bytes()).unwrap();

        assert_eq!(eval, "test-match");
        assert_eq!(sample.get("eval"), None);
        assert_eq!(sample.get("ideal"), Some(&json!("there")));
    }

    #[test]
    fn test_parse_wrapped_request() {
        let body = json!({"request": {"eval": "test-match", "input": "hi"}});
        let (eval, sample) = parse_request(body.to_string().as_bytes()).unwrap();

        assert_eq!(eval, "test-match");
        assert_eq!(sample.get("input"), Some(&json!("hi")));
        assert_eq!(sample.len(), 1);
    }

    #[test]
    fn test_request_field_alongside_others_is_sample_data() {
        let body = json!({"eval": "test-match", "request": {"eval": "other"}});
        let (eval, sample) = parse_request(body.to_string().as_bytes()).unwrap();

        assert_eq!(eval, "test-match");
        assert!(sample.get("request").is_some());
    }

    #[test]
    fn test_parse_rejects_bad_bodies() {
        assert!(matches!(
            parse_request(b"not json"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(parse_request(b"[1, 2]"), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            parse_request(br#"{"input": "x"}"#),
            Err(ApiError::BadRequest(_))
        ));
    }
}
