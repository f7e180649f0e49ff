//! Artifact Loading
//!
//! Reads a model file once, fingerprints it, and hands the bytes to the
//! backend matching its extension (`.onnx` or `.json`).

use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};

use super::inference::{OnnxClassifier, OnnxRegressor};
use super::linear::LinearModel;
use super::{Classifier, ModelFormat, ModelInfo, ModelRole, Regressor};
use crate::logic::error::ModelUnavailableError;
use crate::logic::features::InputSchema;

/// Raw artifact plus the metadata known before parsing
struct RawArtifact {
    info: ModelInfo,
    bytes: Vec<u8>,
}

fn read_artifact(path: &Path, role: ModelRole) -> Result<RawArtifact, ModelUnavailableError> {
    let source = path.display().to_string();

    let format = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("onnx") => ModelFormat::Onnx,
        Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::LinearJson,
        other => {
            return Err(ModelUnavailableError::new(
                source,
                format!("unsupported artifact extension {:?} (expected .onnx or .json)", other.unwrap_or("")),
            ))
        }
    };

    if !path.exists() {
        return Err(ModelUnavailableError::new(source, "artifact not found"));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| ModelUnavailableError::new(&source, format!("failed to read artifact: {}", e)))?;
    let sha256 = hex::encode(Sha256::digest(&bytes));

    tracing::info!(role = %role, path = %source, size = bytes.len(), sha256 = %sha256, "Loading model artifact");

    Ok(RawArtifact {
        info: ModelInfo {
            role,
            format,
            source,
            sha256: Some(sha256),
            loaded_at: Utc::now(),
            // Replaced by the schema the artifact itself declares.
            schema: InputSchema::new(Vec::new()),
        },
        bytes,
    })
}

/// Load the regression artifact
pub fn load_regressor(path: &Path) -> Result<Box<dyn Regressor>, ModelUnavailableError> {
    let RawArtifact { info, bytes } = read_artifact(path, ModelRole::Regression)?;
    let model: Box<dyn Regressor> = match info.format {
        ModelFormat::Onnx => Box::new(OnnxRegressor::new(info, &bytes)?),
        _ => Box::new(LinearModel::from_slice(info, &bytes)?),
    };
    Ok(model)
}

/// Load the classification artifact
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ModelUnavailableError> {
    let RawArtifact { info, bytes } = read_artifact(path, ModelRole::Classification)?;
    let model: Box<dyn Classifier> = match info.format {
        ModelFormat::Onnx => Box::new(OnnxClassifier::new(info, &bytes)?),
        _ => Box::new(LinearModel::from_slice(info, &bytes)?),
    };
    Ok(model)
}
