//! Evalserve HTTP service
//!
//! Exposes evals from the registry over HTTP: `GET /dataset` enumerates an
//! eval's samples and `POST /run` grades a single sample against the eval.

pub mod api;
pub mod config;
pub mod telemetry;

pub use api::{ApiState, CompletionFactory, app, router};
pub use config::ServerConfig;
pub use telemetry::{LogFormat, init_tracing};
