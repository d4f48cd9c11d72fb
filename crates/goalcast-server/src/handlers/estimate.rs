//! Goal estimation API handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use goalcast_core::{EstimationResult, FinancialProfile};

use crate::{AppError, AppState};

/// Liveness message
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Goalcast API is running.",
    })
}

/// Predict time to goal and reconcile with the required savings rate
///
/// POST /api/predict
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<FinancialProfile>,
) -> Result<Json<EstimationResult>, AppError> {
    Ok(Json(state.planner.estimate(&profile)?))
}

/// Solve for the savings rate that meets the desired duration
///
/// POST /api/recommend
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<FinancialProfile>,
) -> Result<Json<EstimationResult>, AppError> {
    Ok(Json(state.planner.recommend(&profile)?))
}
