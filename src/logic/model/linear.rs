//! Linear Artifact - portable JSON model
//!
//! A one-hot linear model that needs no native runtime. Regression
//! artifacts carry three weights per term; classification artifacts carry
//! one and turn the score into a label through the logistic function.
//!
//! ```json
//! {
//!   "task": "classification",
//!   "classes": ["Fail", "Pass"],
//!   "columns": [{ "name": "Building Type", "kind": "categorical" }, ...],
//!   "intercept": [-1.2],
//!   "weights": [{ "Residential": [0.1], "Office": [-0.3] }, [0.02], ...]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{Classifier, ComplianceLabel, ModelInfo, ModelRole, Regressor, RegressionOutput};
use crate::logic::error::{InferenceError, ModelUnavailableError};
use crate::logic::features::{ColumnKind, ColumnSpec, FeatureRecord, FeatureValue, InputSchema};

/// Regression targets in emission order
pub const REGRESSION_OUTPUTS: usize = 3;

/// Probability at or above which the positive class is emitted
pub const DECISION_THRESHOLD: f64 = 0.5;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum LinearTask {
    Regression { outputs: Vec<String> },
    Classification { classes: [String; 2] },
}

/// Weights of one column: per level for categoricals, one vector for numerics
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnWeights {
    Numeric(Vec<f64>),
    Levels(BTreeMap<String, Vec<f64>>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    #[serde(flatten)]
    pub task: LinearTask,
    pub columns: Vec<ColumnSpec>,
    pub intercept: Vec<f64>,
    pub weights: Vec<ColumnWeights>,
}

impl LinearArtifact {
    fn role(&self) -> ModelRole {
        match self.task {
            LinearTask::Regression { .. } => ModelRole::Regression,
            LinearTask::Classification { .. } => ModelRole::Classification,
        }
    }

    fn width(&self) -> usize {
        match self.task {
            LinearTask::Regression { .. } => REGRESSION_OUTPUTS,
            LinearTask::Classification { .. } => 1,
        }
    }

    /// Structural checks; any failure makes the artifact unusable
    pub fn check(&self) -> Result<(), String> {
        if let LinearTask::Regression { outputs } = &self.task {
            if outputs.len() != REGRESSION_OUTPUTS {
                return Err(format!(
                    "regression must declare {} outputs, found {}",
                    REGRESSION_OUTPUTS,
                    outputs.len()
                ));
            }
        }

        let width = self.width();
        if self.intercept.len() != width {
            return Err(format!("intercept must have {} values, found {}", width, self.intercept.len()));
        }
        if self.weights.len() != self.columns.len() {
            return Err(format!(
                "{} columns but {} weight entries",
                self.columns.len(),
                self.weights.len()
            ));
        }

        for (column, weights) in self.columns.iter().zip(&self.weights) {
            match (column.kind, weights) {
                (ColumnKind::Categorical, ColumnWeights::Levels(levels)) => {
                    if let Some((level, w)) = levels.iter().find(|(_, w)| w.len() != width) {
                        return Err(format!(
                            "'{}' level '{}' has {} weights, expected {}",
                            column.name,
                            level,
                            w.len(),
                            width
                        ));
                    }
                }
                (ColumnKind::Integer | ColumnKind::Real, ColumnWeights::Numeric(w)) => {
                    if w.len() != width {
                        return Err(format!(
                            "'{}' has {} weights, expected {}",
                            column.name,
                            w.len(),
                            width
                        ));
                    }
                }
                (kind, _) => {
                    return Err(format!("'{}' is {} but its weights do not match that kind", column.name, kind))
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// MODEL
// ============================================================================

pub struct LinearModel {
    info: ModelInfo,
    artifact: LinearArtifact,
}

impl LinearModel {
    /// Parse and check an artifact for the given role
    pub fn from_slice(mut info: ModelInfo, bytes: &[u8]) -> Result<Self, ModelUnavailableError> {
        let artifact: LinearArtifact = serde_json::from_slice(bytes)
            .map_err(|e| ModelUnavailableError::new(&info.source, format!("malformed artifact: {}", e)))?;
        Self::from_artifact_with(&mut info, artifact).map(|artifact| Self { info, artifact })
    }

    fn from_artifact_with(info: &mut ModelInfo, artifact: LinearArtifact) -> Result<LinearArtifact, ModelUnavailableError> {
        if artifact.role() != info.role {
            return Err(ModelUnavailableError::new(
                &info.source,
                format!("artifact is a {} model, expected {}", artifact.role(), info.role),
            ));
        }
        artifact
            .check()
            .map_err(|reason| ModelUnavailableError::new(&info.source, reason))?;
        info.schema = InputSchema::new(artifact.columns.clone());
        Ok(artifact)
    }

    /// Wrap an artifact built in process
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ModelUnavailableError> {
        let mut info = ModelInfo::in_memory(artifact.role(), InputSchema::new(artifact.columns.clone()));
        let artifact = Self::from_artifact_with(&mut info, artifact)?;
        Ok(Self { info, artifact })
    }

    /// Raw linear scores, one per output
    fn scores(&self, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError> {
        let model = self.info.role.to_string();
        let values = record.values();
        if values.len() != self.artifact.weights.len() {
            return Err(InferenceError::new(
                model,
                format!("model takes {} columns, record has {}", self.artifact.weights.len(), values.len()),
            ));
        }

        let mut scores = self.artifact.intercept.clone();
        for (value, weights) in values.iter().zip(&self.artifact.weights) {
            match (value, weights) {
                (FeatureValue::Text(level), ColumnWeights::Levels(levels)) => {
                    // Levels unseen in training contribute nothing.
                    if let Some(w) = levels.get(*level) {
                        add_scaled(&mut scores, w, 1.0);
                    }
                }
                (cell, ColumnWeights::Numeric(w)) => {
                    let x = cell
                        .as_f64()
                        .ok_or_else(|| InferenceError::new(&model, format!("text cell {:?} in numeric column", cell)))?;
                    add_scaled(&mut scores, w, x);
                }
                (cell, ColumnWeights::Levels(_)) => {
                    return Err(InferenceError::new(&model, format!("numeric cell {:?} in categorical column", cell)))
                }
            }
        }
        Ok(scores)
    }
}

fn add_scaled(scores: &mut [f64], weights: &[f64], x: f64) {
    for (s, w) in scores.iter_mut().zip(weights) {
        *s += w * x;
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Regressor for LinearModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn predict(&self, record: &FeatureRecord) -> Result<RegressionOutput, InferenceError> {
        let scores = self.scores(record)?;
        let triple: [f64; REGRESSION_OUTPUTS] = scores
            .as_slice()
            .try_into()
            .map_err(|_| InferenceError::new("regression", format!("expected 3 outputs, got {}", scores.len())))?;
        Ok(RegressionOutput::from(triple))
    }
}

impl Classifier for LinearModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn predict(&self, record: &FeatureRecord) -> Result<ComplianceLabel, InferenceError> {
        let classes = match &self.artifact.task {
            LinearTask::Classification { classes } => classes,
            LinearTask::Regression { .. } => {
                return Err(InferenceError::new("classification", "artifact is a regression model"))
            }
        };

        let score = self.scores(record)?.first().copied().unwrap_or_default();
        let probability = sigmoid(score);
        let label = if probability >= DECISION_THRESHOLD { &classes[1] } else { &classes[0] };

        tracing::trace!(probability, label = %label, "linear classification");
        Ok(ComplianceLabel::new(label.clone()))
    }
}
