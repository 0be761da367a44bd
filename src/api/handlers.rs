use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ModelStatusResponse, PredictRequest, TrainRequest, TrainResponse,
};
use crate::error::MintscoreError;
use crate::model::Prediction;

/// POST /api/train — fit a fresh model from historical trades and tokens.
pub async fn train_model(
    State(state): State<AppState>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainResponse>, ApiError> {
    if request.trades.is_empty() || request.tokens.is_empty() {
        return Err(MintscoreError::Input("empty dataset provided".to_string()).into());
    }

    info!(
        trades = request.trades.len(),
        tokens = request.tokens.len(),
        "received training request"
    );

    let report = state
        .scorer
        .train(&request.trades, &request.tokens)
        .map_err(|e| {
            error!(error = %e, "training failed");
            e
        })?;

    Ok(Json(TrainResponse {
        status: "model trained".to_string(),
        report,
    }))
}

/// POST /api/predict — score one live candidate.
///
/// An empty trade list is not an error here: it yields the no-signal
/// feature vector and, without a trained model, the zero-score fallback.
pub async fn predict_token(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let prediction = state
        .scorer
        .predict(&request.trades, &request.token)
        .map_err(|e| {
            error!(mint = %request.token.mint, error = %e, "prediction failed");
            e
        })?;

    Ok(Json(prediction))
}

/// GET /api/model — status of the active artifact.
pub async fn model_status(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    let response = match state.scorer.active_model() {
        Some(artifact) => ModelStatusResponse {
            trained: true,
            version: Some(artifact.version.clone()),
            trained_at: Some(artifact.trained_at),
            feature_count: Some(artifact.feature_names.len()),
        },
        None => ModelStatusResponse {
            trained: false,
            version: None,
            trained_at: None,
            feature_count: None,
        },
    };
    Json(response)
}
