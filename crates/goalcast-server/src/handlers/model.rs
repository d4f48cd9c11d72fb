//! Model status and retraining API handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use goalcast_core::{EvaluationMetrics, ModelMetadata, Trainer};

use crate::{AppError, AppState, MAX_TRAINING_RECORDS};

/// Model status response
#[derive(Debug, Serialize)]
pub struct ModelStatusResponse {
    pub loaded: bool,
    pub training: bool,
    pub location: String,
    pub metadata: Option<ModelMetadata>,
}

/// Optional overrides for a training run
#[derive(Debug, Default, Deserialize)]
pub struct TrainRequest {
    pub records: Option<usize>,
    pub seed: Option<u64>,
}

/// Training run response
#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub message: String,
    pub metrics: EvaluationMetrics,
    pub model: ModelMetadata,
}

/// Report whether a model is loaded and what it was trained on
///
/// GET /api/model
pub async fn model_status(State(state): State<Arc<AppState>>) -> Json<ModelStatusResponse> {
    let current = state.handle().current();
    Json(ModelStatusResponse {
        loaded: current.is_some(),
        training: state.handle().is_training(),
        location: state.store.location(),
        metadata: current.map(|m| m.metadata.clone()),
    })
}

/// Generate a fresh dataset, retrain, persist and swap the serving model
///
/// POST /api/train
/// Body (optional): {"records": 1000, "seed": 42}
///
/// A request seed drives both data generation and the evaluation split.
pub async fn train(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TrainResponse>, AppError> {
    let request = parse_train_request(&body)?;
    let records = request.records.unwrap_or(state.training.records);
    let seed = request.seed.unwrap_or(state.training.seed);

    let mut trainer_config = state.trainer.config().clone();
    if let Some(seed) = request.seed {
        trainer_config.seed = seed;
    }
    let trainer = Trainer::new(trainer_config);

    if !(2..=MAX_TRAINING_RECORDS).contains(&records) {
        return Err(AppError::bad_request(&format!(
            "records must be between 2 and {}",
            MAX_TRAINING_RECORDS
        )));
    }

    if state.handle().is_training() {
        return Err(AppError::conflict("A training run is already in progress"));
    }

    tracing::info!(records, seed, "Training requested");

    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        let dataset = worker.generator.generate(records, seed);
        worker
            .handle()
            .retrain(&trainer, worker.store.as_ref(), &dataset)
    })
    .await??;

    Ok(Json(TrainResponse {
        message: format!("Model retrained on {} records", records),
        metrics: outcome.metrics,
        model: outcome.model.metadata,
    }))
}

/// An empty body means defaults; anything else must be a valid request
fn parse_train_request(body: &[u8]) -> Result<TrainRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TrainRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(&format!("Invalid training request: {}", e)))
}
