//! Response Predictor
//!
//! Owns the two models for the life of the process and turns a record
//! into a `PredictionResult`. The record schema is checked against both
//! models before either one is invoked.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{load_classifier, load_regressor, Classifier, ComplianceLabel, ModelInfo, Regressor};
use crate::logic::error::{ModelUnavailableError, PipelineResult, SchemaMismatchError};
use crate::logic::features::{FeatureRecord, InputSchema};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Regression triple plus the compliance label for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub base_shear_kn: f64,
    pub roof_displacement_mm: f64,
    pub max_storey_drift_mm: f64,
    pub compliance_label: ComplianceLabel,
}

/// Inference counters for operators
#[derive(Debug, Clone, Serialize)]
pub struct InferenceStatus {
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

// ============================================================================
// PREDICTOR
// ============================================================================

pub struct ResponsePredictor {
    regressor: Box<dyn Regressor>,
    classifier: Box<dyn Classifier>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl ResponsePredictor {
    pub fn new(regressor: Box<dyn Regressor>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            regressor,
            classifier,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Load both artifacts. Either one failing is fatal.
    pub fn load(regression_path: &Path, classification_path: &Path) -> Result<Self, ModelUnavailableError> {
        let regressor = load_regressor(regression_path)?;
        let classifier = load_classifier(classification_path)?;
        Ok(Self::new(regressor, classifier))
    }

    pub fn regressor_info(&self) -> &ModelInfo {
        self.regressor.info()
    }

    pub fn classifier_info(&self) -> &ModelInfo {
        self.classifier.info()
    }

    /// Check a schema against both models
    fn check_schema(&self, provided: &InputSchema) -> Result<(), SchemaMismatchError> {
        if let Some(mismatch) = self.regressor.input_schema().diff(provided) {
            return Err(SchemaMismatchError {
                model: "regression".to_string(),
                mismatch,
            });
        }
        if let Some(mismatch) = self.classifier.input_schema().diff(provided) {
            return Err(SchemaMismatchError {
                model: "classification".to_string(),
                mismatch,
            });
        }
        Ok(())
    }

    /// Startup check against the layout every record is built with
    pub fn verify_schema(&self) -> Result<(), SchemaMismatchError> {
        self.check_schema(&InputSchema::current())
    }

    /// Run both models on one record
    pub fn predict(&self, record: &FeatureRecord) -> PipelineResult<PredictionResult> {
        self.check_schema(&record.schema())?;

        let start = Instant::now();
        let regression = self.regressor.predict(record)?;
        let label = self.classifier.predict(record)?;
        let elapsed_us = start.elapsed().as_micros() as u64;

        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            elapsed_us,
            base_shear_kn = regression.base_shear_kn,
            max_storey_drift_mm = regression.max_storey_drift_mm,
            label = %label,
            "Inference complete"
        );

        Ok(PredictionResult {
            base_shear_kn: regression.base_shear_kn,
            roof_displacement_mm: regression.roof_displacement_mm,
            max_storey_drift_mm: regression.max_storey_drift_mm,
            compliance_label: label,
        })
    }

    pub fn status(&self) -> InferenceStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        InferenceStatus {
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
pub(crate) mod stubs {
    //! Fixed-output models that record whether they were called

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::logic::error::InferenceError;
    use crate::logic::model::{ModelRole, RegressionOutput};

    pub struct StubRegressor {
        pub info: ModelInfo,
        pub output: [f64; 3],
        pub calls: Arc<AtomicUsize>,
    }

    impl StubRegressor {
        pub fn new(output: [f64; 3]) -> Self {
            Self {
                info: ModelInfo::in_memory(ModelRole::Regression, InputSchema::current()),
                output,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Regressor for StubRegressor {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn predict(&self, _record: &FeatureRecord) -> Result<RegressionOutput, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RegressionOutput::from(self.output))
        }
    }

    pub struct StubClassifier {
        pub info: ModelInfo,
        pub label: &'static str,
        pub fail: bool,
        pub calls: Arc<AtomicUsize>,
    }

    impl StubClassifier {
        pub fn new(label: &'static str) -> Self {
            Self {
                info: ModelInfo::in_memory(ModelRole::Classification, InputSchema::current()),
                label,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn predict(&self, _record: &FeatureRecord) -> Result<ComplianceLabel, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(InferenceError::new("classification", "stub failure"));
            }
            Ok(ComplianceLabel::new(self.label))
        }
    }
}
