//! Model engine status

use serde::Serialize;

use crate::logic::features::layout::layout_hash;
use crate::logic::model::{InferenceStatus, ModelInfo, ResponsePredictor};

/// Loaded models and inference counters, for operators
#[derive(Debug, Serialize)]
pub struct EngineStatus {
    pub schema_hash: u32,
    pub regression: ModelInfo,
    pub classification: ModelInfo,
    pub inference: InferenceStatus,
}

impl EngineStatus {
    pub fn of(predictor: &ResponsePredictor) -> Self {
        Self {
            schema_hash: layout_hash(),
            regression: predictor.regressor_info().clone(),
            classification: predictor.classifier_info().clone(),
            inference: predictor.status(),
        }
    }
}
