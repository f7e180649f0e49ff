//! Presentation Adapter
//!
//! Shapes a prediction and its derived metrics into the widgets the
//! front end renders: metric tiles, the storey drift line chart, and the
//! failure-risk gauge. Formatting lives here so every client shows the
//! same precision.

use serde::Serialize;

use super::derive::DerivedMetrics;
use super::model::PredictionResult;

// ============================================================================
// GAUGE CONFIGURATION
// ============================================================================

pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 100.0;
pub const GAUGE_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: BandColor,
}

pub const GAUGE_BANDS: [GaugeBand; 3] = [
    GaugeBand { from: 0.0, to: 60.0, color: BandColor::Green },
    GaugeBand { from: 60.0, to: 80.0, color: BandColor::Yellow },
    GaugeBand { from: 80.0, to: 100.0, color: BandColor::Red },
];

/// Band a value falls into: [0,60) green, [60,80) yellow, [80,100] red.
/// Values outside the axis (negative risk) have no band.
pub fn band_for(value: f64) -> Option<BandColor> {
    GAUGE_BANDS
        .iter()
        .enumerate()
        .find(|(i, band)| {
            let last = *i == GAUGE_BANDS.len() - 1;
            value >= band.from && (value < band.to || (last && value <= band.to))
        })
        .map(|(_, band)| band.color)
}

// ============================================================================
// WIDGETS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub storey: u32,
    pub drift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub title: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub bands: Vec<GaugeBand>,
    pub threshold: f64,
    pub band: Option<BandColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub metrics: Vec<MetricTile>,
    pub drift_chart: LineChart,
    pub risk_gauge: Gauge,
}

fn tile(label: &'static str, value: String) -> MetricTile {
    MetricTile { label, value }
}

pub fn present(prediction: &PredictionResult, derived: &DerivedMetrics) -> Dashboard {
    let metrics = vec![
        tile("Base Shear (kN)", format!("{:.2}", prediction.base_shear_kn)),
        tile("Roof Displacement (mm)", format!("{:.2}", prediction.roof_displacement_mm)),
        tile("Max Storey Drift (mm)", format!("{:.3}", prediction.max_storey_drift_mm)),
        tile("Interstorey Drift Ratio", format!("{:.5}", derived.drift_ratio)),
        tile("Time Period (s)", format!("{:.2}", derived.time_period_s)),
        tile("IS 1893 Compliant?", (if derived.is_compliant { "Yes" } else { "No" }).to_string()),
    ];

    let points = derived
        .storey_drift_profile
        .iter()
        .zip(1u32..)
        .map(|(&drift, storey)| ChartPoint { storey, drift })
        .collect();

    Dashboard {
        metrics,
        drift_chart: LineChart {
            title: "Interstorey Drift Plot",
            x_label: "Storey",
            y_label: "Drift Ratio",
            points,
        },
        risk_gauge: Gauge {
            title: "Risk of Failure (%)",
            value: derived.risk_percent,
            min: GAUGE_MIN,
            max: GAUGE_MAX,
            bands: GAUGE_BANDS.to_vec(),
            threshold: GAUGE_THRESHOLD,
            band: band_for(derived.risk_percent),
        },
    }
}
