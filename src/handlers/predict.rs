//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::models::{PredictRequest, PredictResponse};
use crate::{logic, AppResult, AppState};

/// Run the full pipeline for one building.
///
/// Inference is synchronous, so it runs on the blocking pool; the
/// predictor is shared read-only across requests. Body rejections are
/// reported through `AppError` like any other invalid input.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    let predictor = state.predictor.clone();
    let output = tokio::task::spawn_blocking(move || logic::run(&predictor, &req)).await??;

    Ok(Json(output.into()))
}
