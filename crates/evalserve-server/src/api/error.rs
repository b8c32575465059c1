//! API error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use evalserve_core::SessionError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::EvalNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Session(
                SessionError::ParameterSyntax { .. }
                | SessionError::MalformedEvalName(_)
                | SessionError::EvalConstruction { .. },
            )
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalserve_core::GradingError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(SessionError::EvalNotFound {
            name: "x".to_string(),
            available: vec![],
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let syntax = ApiError::from(SessionError::ParameterSyntax {
            token: "x".to_string(),
        });
        assert_eq!(syntax.status(), StatusCode::BAD_REQUEST);

        let grading = ApiError::from(SessionError::from(GradingError::MissingField {
            sample_id: "s.0".to_string(),
            field: "ideal".to_string(),
        }));
        assert_eq!(grading.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::BadRequest("empty".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
