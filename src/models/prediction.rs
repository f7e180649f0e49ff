//! Prediction request/response bodies

use serde::Serialize;
use uuid::Uuid;

use crate::logic::derive::DerivedMetrics;
use crate::logic::features::{FeatureRecord, SCHEMA_VERSION};
use crate::logic::model::PredictionResult;
use crate::logic::presentation::Dashboard;
use crate::logic::PipelineOutput;

/// The request body is the raw input record
pub use crate::logic::features::UserInputs as PredictRequest;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub schema_version: u8,
    pub inputs: FeatureRecord,
    pub prediction: PredictionResult,
    pub derived: DerivedMetrics,
    pub dashboard: Dashboard,
}

impl From<PipelineOutput> for PredictResponse {
    fn from(output: PipelineOutput) -> Self {
        Self {
            request_id: output.request_id,
            schema_version: SCHEMA_VERSION,
            inputs: output.record,
            prediction: output.prediction,
            derived: output.derived,
            dashboard: output.dashboard,
        }
    }
}
