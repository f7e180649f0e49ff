//! Model Module - Opaque Response Models
//!
//! The regressor and classifier are black boxes behind two capability
//! traits. A loaded artifact, a remote call or a test stub can stand in
//! for either one.

pub mod artifact;
pub mod inference;
pub mod linear;
pub mod predictor;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::InferenceError;
use super::features::{FeatureRecord, InputSchema};

// Re-export common types
pub use artifact::{load_classifier, load_regressor};
pub use predictor::{InferenceStatus, PredictionResult, ResponsePredictor};

// ============================================================================
// MODEL OUTPUTS
// ============================================================================

/// The three regression targets, in the fixed order the regressor emits them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionOutput {
    pub base_shear_kn: f64,
    pub roof_displacement_mm: f64,
    pub max_storey_drift_mm: f64,
}

impl From<[f64; 3]> for RegressionOutput {
    fn from([base_shear_kn, roof_displacement_mm, max_storey_drift_mm]: [f64; 3]) -> Self {
        Self {
            base_shear_kn,
            roof_displacement_mm,
            max_storey_drift_mm,
        }
    }
}

/// Label produced by the compliance classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplianceLabel(String);

impl ComplianceLabel {
    pub const PASS: &'static str = "Pass";
    pub const FAIL: &'static str = "Fail";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only the exact label "Pass" counts as compliant
    pub fn is_pass(&self) -> bool {
        self.0 == Self::PASS
    }
}

impl fmt::Display for ComplianceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// MODEL METADATA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Regression,
    Classification,
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRole::Regression => write!(f, "regression"),
            ModelRole::Classification => write!(f, "classification"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    Onnx,
    LinearJson,
    InMemory,
}

/// What was loaded, from where, and what it expects
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub role: ModelRole,
    pub format: ModelFormat,
    pub source: String,
    pub sha256: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub schema: InputSchema,
}

impl ModelInfo {
    /// Metadata for a model built in process (stubs, embedded models)
    pub fn in_memory(role: ModelRole, schema: InputSchema) -> Self {
        Self {
            role,
            format: ModelFormat::InMemory,
            source: "<memory>".to_string(),
            sha256: None,
            loaded_at: Utc::now(),
            schema,
        }
    }
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Multi-output regressor: base shear, roof displacement, max storey drift
pub trait Regressor: Send + Sync {
    fn info(&self) -> &ModelInfo;

    fn predict(&self, record: &FeatureRecord) -> Result<RegressionOutput, InferenceError>;

    fn input_schema(&self) -> &InputSchema {
        &self.info().schema
    }
}

/// Binary compliance classifier
pub trait Classifier: Send + Sync {
    fn info(&self) -> &ModelInfo;

    fn predict(&self, record: &FeatureRecord) -> Result<ComplianceLabel, InferenceError>;

    fn input_schema(&self) -> &InputSchema {
        &self.info().schema
    }
}
