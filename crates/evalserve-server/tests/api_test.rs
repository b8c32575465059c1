//! API Integration Tests
//!
//! Tests full HTTP request/response cycles against the built-in registry

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use evalserve_core::{CompletionFn, Registry, StubCompletionFn};
use evalserve_server::api::TARGET_ENDPOINT_HEADER;
use evalserve_server::{ApiState, ServerConfig, app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn setup_test_app() -> axum::Router {
    let registry = Registry::builtin().expect("Failed to load registry");
    app(ApiState::new(registry, ServerConfig::default()))
}

async fn json_response(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("Invalid JSON response");
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

// ============================================================================
// Discovery
// ============================================================================

#[tokio::test]
async fn test_manifest() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"runURL": "/run"}));
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_evals() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/evals")).await;

    assert_eq!(status, StatusCode::OK);
    let names = body["evals"].as_array().expect("evals should be an array");
    assert!(names.contains(&json!("test-match")));
    assert!(names.contains(&json!("test-match.s1.simple-v0")));
}

#[tokio::test]
async fn test_assert_placeholder() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, post_json("/assert", &json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "unimplemented"}));
}

// ============================================================================
// Dataset
// ============================================================================

#[tokio::test]
async fn test_dataset_tags_samples() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/dataset?eval=test-match")).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 3);
    for entry in data {
        assert_eq!(entry["input"]["eval"], "test-match");
        assert!(entry["input"]["ideal"].is_string());
    }
}

#[tokio::test]
async fn test_dataset_uses_default_eval() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/dataset")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_dataset_unknown_eval() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, get("/dataset?eval=nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("Eval nope not found"));
}

#[tokio::test]
async fn test_dataset_respects_configured_cap() {
    let registry = Registry::builtin().expect("Failed to load registry");
    let config = ServerConfig {
        max_samples: Some(1),
        ..ServerConfig::default()
    };
    let app = app(ApiState::new(registry, config));

    let (status, body) = json_response(&app, get("/dataset?eval=test-match")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

// ============================================================================
// Run
// ============================================================================

#[tokio::test]
async fn test_run_returns_finite_report() {
    let app = setup_test_app();
    let request = json!({
        "eval": "test-match",
        "input": [{"role": "user", "content": "Once upon a "}],
        "ideal": "time"
    });
    let (status, body) = json_response(&app, post_json("/run", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"accuracy": 0.0}));
}

#[tokio::test]
async fn test_run_accepts_wrapped_request() {
    let app = setup_test_app();
    let request = json!({
        "request": {
            "eval": "test-includes",
            "input": "Capital of France?",
            "ideal": "Paris"
        }
    });
    let (status, body) = json_response(&app, post_json("/run", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accuracy"], json!(0.0));
    assert!(body.get("bootstrap_std").is_none());
}

#[tokio::test]
async fn test_run_missing_eval_field() {
    let app = setup_test_app();
    let (status, body) = json_response(&app, post_json("/run", &json!({"input": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("eval"));
}

#[tokio::test]
async fn test_run_invalid_json() {
    let app = setup_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/run")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = json_response(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_run_bad_extra_params() {
    let registry = Registry::builtin().expect("Failed to load registry");
    let config = ServerConfig {
        extra_eval_params: "max_tokens".to_string(),
        ..ServerConfig::default()
    };
    let app = app(ApiState::new(registry, config));
    let request = json!({"eval": "test-match", "input": "x", "ideal": "y"});

    let (status, body) = json_response(&app, post_json("/run", &request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("max_tokens"));
}

#[tokio::test]
async fn test_run_grading_error() {
    let app = setup_test_app();
    let request = json!({"eval": "test-match", "input": "no ideal here"});

    let (status, body) = json_response(&app, post_json("/run", &request)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("ideal"));
}

#[tokio::test]
async fn test_run_passes_target_endpoint_to_factory() {
    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let stub = Arc::new(StubCompletionFn::new());

    let factory_seen = seen.clone();
    let factory_stub = stub.clone();
    let state = ApiState::new(Registry::builtin().unwrap(), ServerConfig::default())
        .with_completion_factory(Arc::new(move |target: Option<&str>| {
            factory_seen.lock().unwrap().push(target.map(str::to_string));
            factory_stub.clone() as Arc<dyn CompletionFn>
        }));
    let app = app(state);

    let request = Request::builder()
        .method("POST")
        .uri("/run")
        .header(TARGET_ENDPOINT_HEADER, "http://model.internal/v1")
        .body(Body::from(
            json!({"eval": "test-match", "input": "hello", "ideal": "world"}).to_string(),
        ))
        .unwrap();
    let (status, _) = json_response(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("http://model.internal/v1".to_string())]
    );
    assert_eq!(stub.call_count(), 1);
}
