//! Derivation Engine
//!
//! Closed-form quantities computed from the building height, storey count
//! and model outputs. Pure: no I/O beyond warnings, no failure modes.
//!
//! Order of evaluation:
//! 1. drift ratio = max storey drift / height (height 0 divides by 1)
//! 2. time period = 0.075 · h^0.75 (IS 1893 empirical, height only)
//! 3. risk = min(100, drift ratio / 0.004 · 100), no lower clamp
//! 4. compliant = label is exactly "Pass"
//! 5. storey profile = `floor_count` points from 0.5·ratio up to ratio

use serde::{Deserialize, Serialize};

use super::model::PredictionResult;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Allowable interstorey drift ratio
pub const ALLOWABLE_DRIFT_RATIO: f64 = 0.004;

/// Empirical period formula coefficient (RC moment frame)
pub const TIME_PERIOD_COEFFICIENT: f64 = 0.075;
pub const TIME_PERIOD_EXPONENT: f64 = 0.75;

/// Risk is reported in percent and never exceeds this
pub const RISK_CEILING: f64 = 100.0;

/// Share of the roof-level drift ratio assigned to the first storey
pub const PROFILE_BASE_FRACTION: f64 = 0.5;

// ============================================================================
// DERIVED METRICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub drift_ratio: f64,
    pub time_period_s: f64,
    pub risk_percent: f64,
    pub is_compliant: bool,
    pub storey_drift_profile: Vec<f64>,
}

pub fn drift_ratio(max_storey_drift_mm: f64, height_m: f64) -> f64 {
    if height_m != 0.0 {
        max_storey_drift_mm / height_m
    } else {
        tracing::warn!(max_storey_drift_mm, "Zero building height, drift ratio uses unit height");
        max_storey_drift_mm / 1.0
    }
}

pub fn time_period(height_m: f64) -> f64 {
    TIME_PERIOD_COEFFICIENT * height_m.powf(TIME_PERIOD_EXPONENT)
}

/// Upper clamp only: a negative ratio yields a negative risk, which is
/// kept as a sign of an anomalous prediction.
pub fn risk_percent(drift_ratio: f64) -> f64 {
    let risk = (drift_ratio / ALLOWABLE_DRIFT_RATIO * 100.0).min(RISK_CEILING);
    if risk < 0.0 {
        tracing::warn!(drift_ratio, risk, "Negative drift ratio from regressor");
    }
    risk
}

/// Evenly spaced values from `PROFILE_BASE_FRACTION · ratio` to `ratio`,
/// endpoints exact. A single storey collapses to `[ratio]`.
pub fn storey_drift_profile(drift_ratio: f64, floor_count: u32) -> Vec<f64> {
    match floor_count {
        0 => Vec::new(),
        1 => vec![drift_ratio],
        n => {
            let start = PROFILE_BASE_FRACTION * drift_ratio;
            let step = (drift_ratio - start) / f64::from(n - 1);
            let mut profile: Vec<f64> = (0..n).map(|i| start + step * f64::from(i)).collect();
            if let Some(last) = profile.last_mut() {
                *last = drift_ratio;
            }
            profile
        }
    }
}

/// Derive every metric for one prediction
pub fn derive(height_m: f64, floor_count: u32, prediction: &PredictionResult) -> DerivedMetrics {
    let drift_ratio = drift_ratio(prediction.max_storey_drift_mm, height_m);

    DerivedMetrics {
        drift_ratio,
        time_period_s: time_period(height_m),
        risk_percent: risk_percent(drift_ratio),
        is_compliant: prediction.compliance_label.is_pass(),
        storey_drift_profile: storey_drift_profile(drift_ratio, floor_count),
    }
}
