//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::logic::PipelineError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    ValidationError(String),

    // Model errors
    ModelUnavailable(String),
    SchemaMismatch(String),
    InferenceError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Prediction models unavailable")
            }
            AppError::SchemaMismatch(msg) => {
                tracing::error!("Schema mismatch: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(e) => AppError::ValidationError(e.to_string()),
            PipelineError::ModelUnavailable(e) => AppError::ModelUnavailable(e.to_string()),
            PipelineError::SchemaMismatch(e) => AppError::SchemaMismatch(e.to_string()),
            PipelineError::Inference(e) => AppError::InferenceError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::ValidationError(format!("invalid request body: {}", err.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("prediction task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::InvalidInputError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::ModelUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::SchemaMismatch("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::InferenceError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_invalid_input_maps_to_validation() {
        let err: AppError = PipelineError::from(InvalidInputError::single("Steel Grade: is missing")).into();
        match err {
            AppError::ValidationError(msg) => assert!(msg.contains("Steel Grade")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
