//! Prediction Pipeline
//!
//! build → predict → derive → present, all-or-nothing per request.
//! Each run allocates its own record and results; only the predictor
//! (read-only after startup) is shared.

use serde::Serialize;
use uuid::Uuid;

use super::derive::{derive, DerivedMetrics};
use super::error::PipelineResult;
use super::features::{build, FeatureRecord, UserInputs};
use super::model::{PredictionResult, ResponsePredictor};
use super::presentation::{present, Dashboard};

/// Everything one request produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub request_id: Uuid,
    pub record: FeatureRecord,
    pub prediction: PredictionResult,
    pub derived: DerivedMetrics,
    pub dashboard: Dashboard,
}

pub fn run(predictor: &ResponsePredictor, inputs: &UserInputs) -> PipelineResult<PipelineOutput> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("prediction", %request_id);
    let _enter = span.enter();

    let record = build(inputs)?;
    let prediction = predictor.predict(&record)?;
    let derived = derive(record.total_height_m(), record.floor_count(), &prediction);
    let dashboard = present(&prediction, &derived);

    tracing::info!(
        drift_ratio = derived.drift_ratio,
        risk_percent = derived.risk_percent,
        compliant = derived.is_compliant,
        "Prediction served"
    );

    Ok(PipelineOutput {
        request_id,
        record,
        prediction,
        derived,
        dashboard,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::logic::error::PipelineError;
    use crate::logic::features::sample_inputs;
    use crate::logic::model::predictor::stubs::{StubClassifier, StubRegressor};

    fn reference_predictor() -> ResponsePredictor {
        ResponsePredictor::new(
            Box::new(StubRegressor::new([120.5, 45.2, 0.06])),
            Box::new(StubClassifier::new("Pass")),
        )
    }

    #[test]
    fn test_end_to_end_reference_building() {
        let output = run(&reference_predictor(), &sample_inputs()).unwrap();

        assert_eq!(output.prediction.base_shear_kn, 120.5);
        assert!((output.derived.drift_ratio - 0.004).abs() < 1e-15);
        assert!((output.derived.time_period_s - 0.572).abs() < 1e-3);
        assert!((output.derived.risk_percent - 100.0).abs() < 1e-9);
        assert!(output.derived.is_compliant);
        assert_eq!(output.derived.storey_drift_profile.len(), 5);
        assert_eq!(output.dashboard.metrics.len(), 6);
        assert_eq!(output.dashboard.drift_chart.points.len(), 5);
    }

    #[test]
    fn test_missing_field_fails_before_any_model_call() {
        let regressor = StubRegressor::new([120.5, 45.2, 0.06]);
        let classifier = StubClassifier::new("Pass");
        let regressor_calls = regressor.calls.clone();
        let classifier_calls = classifier.calls.clone();
        let predictor = ResponsePredictor::new(Box::new(regressor), Box::new(classifier));

        let mut inputs = sample_inputs();
        inputs.plan_aspect_ratio = None;

        match run(&predictor, &inputs) {
            Err(PipelineError::InvalidInput(err)) => {
                assert_eq!(err.violations, vec!["Plan Aspect Ratio: is missing".to_string()]);
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
        assert_eq!(regressor_calls.load(Ordering::SeqCst), 0);
        assert_eq!(classifier_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_each_run_gets_fresh_request_id() {
        let predictor = reference_predictor();
        let a = run(&predictor, &sample_inputs()).unwrap();
        let b = run(&predictor, &sample_inputs()).unwrap();

        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.derived, b.derived);
        assert_eq!(predictor.status().inference_count, 2);
    }

    #[test]
    fn test_fail_label_end_to_end() {
        let predictor = ResponsePredictor::new(
            Box::new(StubRegressor::new([80.0, 20.0, 0.03])),
            Box::new(StubClassifier::new("Fail")),
        );
        let output = run(&predictor, &sample_inputs()).unwrap();

        assert!(!output.derived.is_compliant);
        assert!((output.derived.risk_percent - 50.0).abs() < 1e-9);
        assert_eq!(output.dashboard.metrics[5].value, "No");
    }
}
