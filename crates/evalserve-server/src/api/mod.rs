//! HTTP API
//!
//! | Method | Path       | Purpose                                        |
//! |--------|------------|------------------------------------------------|
//! | GET    | `/`        | Manifest naming the run endpoint               |
//! | GET    | `/health`  | Liveness                                       |
//! | GET    | `/evals`   | Registered eval names                          |
//! | GET    | `/dataset` | Samples of an eval, tagged with its name       |
//! | POST   | `/run`     | Grade one sample, returning the sanitized report |
//! | POST   | `/assert`  | Placeholder, always `unimplemented`            |

mod dataset;
mod error;
mod run;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use evalserve_core::{CompletionFn, EvalSessionArguments, Registry, StubCompletionFn};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use error::ApiError;
pub use run::TARGET_ENDPOINT_HEADER;

/// Builds the completion function for one request
///
/// Receives the value of the target endpoint header, if the caller sent one.
pub type CompletionFactory = Arc<dyn Fn(Option<&str>) -> Arc<dyn CompletionFn> + Send + Sync>;

/// Shared state of the API handlers
#[derive(Clone)]
pub struct ApiState {
    registry: Arc<Registry>,
    config: Arc<ServerConfig>,
    completion_factory: CompletionFactory,
}

impl ApiState {
    /// State answering every completion with the dummy response
    pub fn new(registry: Registry, config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            completion_factory: Arc::new(|_: Option<&str>| -> Arc<dyn CompletionFn> {
                Arc::new(StubCompletionFn::new())
            }),
        }
    }

    pub fn with_completion_factory(mut self, factory: CompletionFactory) -> Self {
        self.completion_factory = factory;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn session_args(&self, eval: &str) -> EvalSessionArguments {
        self.config.session_args(eval)
    }

    /// A fresh copy for one session; sessions take ownership of their registry
    fn session_registry(&self) -> Registry {
        Registry::clone(&self.registry)
    }

    fn completion_fn(&self, target: Option<&str>) -> Arc<dyn CompletionFn> {
        (self.completion_factory)(target)
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Routes without state or middleware
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(manifest))
        .route("/health", get(health_check))
        .route("/evals", get(list_evals))
        .route("/dataset", get(dataset::get_dataset))
        .route("/run", post(run::run_sample))
        .route("/assert", post(assert_placeholder))
}

/// Complete application with tracing and CORS
pub fn app(state: ApiState) -> Router {
    router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn manifest() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "runURL": "/run" })))
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "evalserve",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

async fn list_evals(State(state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "evals": state.registry.eval_names() })),
    )
}

async fn assert_placeholder() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "result": "unimplemented" })))
}
