//! Pipeline Errors
//!
//! One error type per failure class of the prediction pipeline.
//! None of them are retried: every stage is deterministic and synchronous.

use thiserror::Error;

use super::features::SchemaMismatch;

/// A request field is missing, malformed, or outside its declared domain.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid input: {}", .violations.join("; "))]
pub struct InvalidInputError {
    pub violations: Vec<String>,
}

impl InvalidInputError {
    pub fn single(violation: impl Into<String>) -> Self {
        Self { violations: vec![violation.into()] }
    }
}

/// A model artifact could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
#[error("model '{artifact}' unavailable: {reason}")]
pub struct ModelUnavailableError {
    pub artifact: String,
    pub reason: String,
}

impl ModelUnavailableError {
    pub fn new(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }
}

/// The record layout does not match what a model was fitted on.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("schema mismatch for {model} model: {mismatch}")]
pub struct SchemaMismatchError {
    pub model: String,
    pub mismatch: SchemaMismatch,
}

/// Inference itself failed after the schema check passed.
#[derive(Debug, Error)]
#[error("inference failed in {model} model: {reason}")]
pub struct InferenceError {
    pub model: String,
    pub reason: String,
}

impl InferenceError {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

/// Any failure of a single pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    ModelUnavailable(#[from] ModelUnavailableError),

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_lists_every_violation() {
        let err = InvalidInputError {
            violations: vec!["a is missing".into(), "b out of range".into()],
        };
        assert_eq!(err.to_string(), "invalid input: a is missing; b out of range");
    }

    #[test]
    fn test_model_unavailable_names_artifact() {
        let err = ModelUnavailableError::new("regression_model.onnx", "file not found");
        assert!(err.to_string().contains("regression_model.onnx"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: PipelineError = InvalidInputError::single("x").into();
        assert_eq!(err.to_string(), "invalid input: x");
    }
}
