//! Dataset enumeration

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use evalserve_core::gather_samples;
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct DatasetQuery {
    pub eval: Option<String>,
}

/// `GET /dataset?eval=<name>`
///
/// Each entry wraps one sample as `{"input": sample}`. Nothing is graded.
pub async fn get_dataset(
    State(state): State<ApiState>,
    Query(query): Query<DatasetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let eval = query
        .eval
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.config().default_eval.clone());
    tracing::info!("Collecting samples for eval {}", eval);

    let args = state.session_args(&eval);
    let samples = gather_samples(
        &args,
        state.completion_fn(None),
        Some(state.session_registry()),
    )
    .await?;

    let data: Vec<_> = samples
        .into_iter()
        .map(|sample| json!({ "input": sample }))
        .collect();
    Ok(Json(json!({ "data": data })))
}
