//! Model engine handler

use axum::{extract::State, Json};

use crate::models::EngineStatus;
use crate::AppState;

pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(EngineStatus::of(&state.predictor))
}
