//! Inference Engine - ONNX Runtime Integration
//!
//! Runs exported regression/classification graphs. The graph declares one
//! input per column, named by the column identifier, so the expected schema
//! is read straight from the session instead of being assumed.

use std::sync::OnceLock;
use std::time::Instant;

use ndarray::Array2;
use ort::environment::Environment;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DynValue, Tensor, TensorElementType, ValueType};
use parking_lot::Mutex;

use super::{Classifier, ComplianceLabel, ModelInfo, Regressor, RegressionOutput};
use crate::logic::error::{InferenceError, ModelUnavailableError};
use crate::logic::features::{ColumnKind, ColumnSpec, FeatureRecord, FeatureValue, InputSchema};

/// Values the regression graph must emit: base shear, roof displacement, drift
pub const REGRESSION_OUTPUTS: usize = 3;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// ONNX Runtime allows one environment per process
static ENVIRONMENT: OnceLock<Result<Environment, String>> = OnceLock::new();

fn environment() -> Result<&'static Environment, String> {
    ENVIRONMENT
        .get_or_init(|| {
            ort::init()
                .with_name("seismic-predictor")
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| format!("ONNX Runtime unavailable: {}", e))
}

// ============================================================================
// SESSION
// ============================================================================

/// Loaded ONNX graph plus what it was found to expect
pub struct OnnxSession {
    /// ort runs through `&mut Session`; the lock only serializes calls,
    /// the graph itself is never modified after load.
    session: Mutex<Session>,
    input_names: Vec<String>,
    input_types: Vec<TensorElementType>,
    output_name: String,
    output_type: TensorElementType,
    /// Declared shape of output 0, `-1` for dynamic dimensions
    output_shape: Vec<i64>,
}

impl OnnxSession {
    /// Build a session from artifact bytes and read its declared inputs
    pub fn from_bytes(artifact: &str, bytes: &[u8]) -> Result<(Self, InputSchema), ModelUnavailableError> {
        let unavailable = |reason: String| ModelUnavailableError::new(artifact, reason);

        let environment = environment().map_err(unavailable)?;
        let session = Session::builder(environment)
            .map_err(|e| unavailable(format!("session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| unavailable(format!("optimization error: {}", e)))?
            .commit_from_memory(bytes)
            .map_err(|e| unavailable(format!("failed to load graph: {}", e)))?;

        let mut columns = Vec::with_capacity(session.inputs().len());
        let mut input_names = Vec::with_capacity(session.inputs().len());
        let mut input_types = Vec::with_capacity(session.inputs().len());
        for input in session.inputs() {
            let ty = match input.dtype() {
                ValueType::Tensor { ty, .. } => *ty,
                other => {
                    return Err(unavailable(format!(
                        "input '{}' is not a tensor ({:?})",
                        input.name(),
                        other
                    )))
                }
            };
            let kind = column_kind(ty).ok_or_else(|| {
                unavailable(format!("input '{}' has unsupported element type {:?}", input.name(), ty))
            })?;
            columns.push(ColumnSpec::new(input.name(), kind));
            input_names.push(input.name().to_string());
            input_types.push(ty);
        }

        let output = session
            .outputs()
            .first()
            .ok_or_else(|| unavailable("graph declares no outputs".to_string()))?;
        let (output_type, output_shape) = match output.dtype() {
            ValueType::Tensor { ty, shape, .. } => (*ty, shape.to_vec()),
            other => {
                return Err(unavailable(format!(
                    "output '{}' is not a tensor ({:?})",
                    output.name(),
                    other
                )))
            }
        };
        let output_name = output.name().to_string();

        tracing::debug!(
            artifact,
            inputs = columns.len(),
            output = %output_name,
            shape = ?output_shape,
            "ONNX graph loaded"
        );

        Ok((
            Self {
                session: Mutex::new(session),
                input_names,
                input_types,
                output_name,
                output_type,
                output_shape,
            },
            InputSchema::new(columns),
        ))
    }

    /// One [1, 1] tensor per column, typed as the graph declares it
    fn input_tensors(
        &self,
        model: &str,
        record: &FeatureRecord,
    ) -> Result<Vec<(String, DynValue)>, InferenceError> {
        let values = record.values();
        if values.len() != self.input_names.len() {
            return Err(InferenceError::new(
                model,
                format!("graph takes {} inputs, record has {}", self.input_names.len(), values.len()),
            ));
        }

        let tensor_err = |e: ort::Error| InferenceError::new(model, format!("tensor error: {}", e));

        self.input_names
            .iter()
            .zip(values.iter())
            .zip(&self.input_types)
            .map(|((name, value), ty)| {
                let tensor = match (value, ty) {
                    (FeatureValue::Text(s), TensorElementType::String) => {
                        Tensor::from_string_array(&Array2::from_elem((1, 1), s.to_string()))
                            .map_err(tensor_err)?
                            .into_dyn()
                    }
                    (FeatureValue::Integer(v), TensorElementType::Int64) => {
                        Tensor::from_array(Array2::from_elem((1, 1), *v))
                            .map_err(tensor_err)?
                            .into_dyn()
                    }
                    (cell, TensorElementType::Float32) if cell.as_f64().is_some() => {
                        let v = cell.as_f64().unwrap_or_default() as f32;
                        Tensor::from_array(Array2::from_elem((1, 1), v))
                            .map_err(tensor_err)?
                            .into_dyn()
                    }
                    (cell, TensorElementType::Float64) if cell.as_f64().is_some() => {
                        let v = cell.as_f64().unwrap_or_default();
                        Tensor::from_array(Array2::from_elem((1, 1), v))
                            .map_err(tensor_err)?
                            .into_dyn()
                    }
                    (cell, ty) => {
                        return Err(InferenceError::new(
                            model,
                            format!("cannot feed {:?} into '{}' ({:?})", cell, name, ty),
                        ))
                    }
                };
                Ok((name.clone(), tensor))
            })
            .collect()
    }

    /// Run the graph and return output 0 as f64 values
    fn run_numeric(&self, model: &str, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError> {
        let inputs = self.input_tensors(model, record)?;
        let fail = |e: ort::Error| InferenceError::new(model, e.to_string());

        let mut session = self.session.lock();
        let outputs = session.run(inputs).map_err(fail)?;
        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::new(model, "no output"))?;

        let values = match self.output_type {
            TensorElementType::Float32 => {
                output.try_extract_tensor::<f32>().map_err(fail)?.1.iter().map(|&v| v as f64).collect()
            }
            TensorElementType::Float64 => output.try_extract_tensor::<f64>().map_err(fail)?.1.to_vec(),
            other => {
                return Err(InferenceError::new(model, format!("numeric output expected, got {:?}", other)))
            }
        };
        Ok(values)
    }

    /// Run the graph and return output 0 as labels
    fn run_labels(&self, model: &str, record: &FeatureRecord) -> Result<Vec<String>, InferenceError> {
        let inputs = self.input_tensors(model, record)?;
        let fail = |e: ort::Error| InferenceError::new(model, e.to_string());

        let mut session = self.session.lock();
        let outputs = session.run(inputs).map_err(fail)?;
        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::new(model, "no output"))?;

        Ok(output.try_extract_strings().map_err(fail)?.1)
    }
}

fn column_kind(ty: TensorElementType) -> Option<ColumnKind> {
    match ty {
        TensorElementType::String => Some(ColumnKind::Categorical),
        TensorElementType::Int64 => Some(ColumnKind::Integer),
        TensorElementType::Float32 | TensorElementType::Float64 => Some(ColumnKind::Real),
        _ => None,
    }
}

/// Reject a regression output shape that cannot hold exactly three values.
///
/// Fully fixed shapes must multiply out to three. With dynamic dimensions
/// only a fixed trailing dimension can be judged; the rest is checked per
/// request.
pub fn check_regression_shape(artifact: &str, shape: &[i64]) -> Result<(), ModelUnavailableError> {
    let expected = REGRESSION_OUTPUTS as i64;

    if shape.is_empty() {
        tracing::warn!(artifact, "regression output shape undeclared; arity checked per request");
        return Ok(());
    }

    if shape.iter().all(|&d| d >= 0) {
        let total: i64 = shape.iter().product();
        if total != expected {
            return Err(ModelUnavailableError::new(
                artifact,
                format!("regression output {:?} holds {} values, expected {}", shape, total, expected),
            ));
        }
        return Ok(());
    }

    match shape.last() {
        Some(&last) if last >= 0 && last != expected => Err(ModelUnavailableError::new(
            artifact,
            format!("regression output {:?} has {} values per row, expected {}", shape, last, expected),
        )),
        _ => {
            tracing::warn!(artifact, shape = ?shape, "regression output has dynamic dimensions; arity checked per request");
            Ok(())
        }
    }
}

// ============================================================================
// REGRESSOR
// ============================================================================

pub struct OnnxRegressor {
    info: ModelInfo,
    session: OnnxSession,
}

impl OnnxRegressor {
    pub fn new(mut info: ModelInfo, bytes: &[u8]) -> Result<Self, ModelUnavailableError> {
        let (session, schema) = OnnxSession::from_bytes(&info.source, bytes)?;
        if !matches!(session.output_type, TensorElementType::Float32 | TensorElementType::Float64) {
            return Err(ModelUnavailableError::new(
                &info.source,
                format!("regression output must be float, got {:?}", session.output_type),
            ));
        }
        check_regression_shape(&info.source, &session.output_shape)?;
        info.schema = schema;
        Ok(Self { info, session })
    }
}

impl Regressor for OnnxRegressor {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn predict(&self, record: &FeatureRecord) -> Result<RegressionOutput, InferenceError> {
        let start = Instant::now();
        let values = self.session.run_numeric("regression", record)?;

        let triple: [f64; REGRESSION_OUTPUTS] = values.as_slice().try_into().map_err(|_| {
            InferenceError::new(
                "regression",
                format!("expected {} outputs, got {}", REGRESSION_OUTPUTS, values.len()),
            )
        })?;

        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "ONNX regression done");
        Ok(RegressionOutput::from(triple))
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct OnnxClassifier {
    info: ModelInfo,
    session: OnnxSession,
}

impl OnnxClassifier {
    pub fn new(mut info: ModelInfo, bytes: &[u8]) -> Result<Self, ModelUnavailableError> {
        let (session, schema) = OnnxSession::from_bytes(&info.source, bytes)?;
        if session.output_type != TensorElementType::String {
            return Err(ModelUnavailableError::new(
                &info.source,
                format!("classification output must be a string label, got {:?}", session.output_type),
            ));
        }
        info.schema = schema;
        Ok(Self { info, session })
    }
}

impl Classifier for OnnxClassifier {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn predict(&self, record: &FeatureRecord) -> Result<ComplianceLabel, InferenceError> {
        let start = Instant::now();
        let labels = self.session.run_labels("classification", record)?;

        let label = labels
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::new("classification", "empty label tensor"))?;

        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, label = %label, "ONNX classification done");
        Ok(ComplianceLabel::new(label))
    }
}
