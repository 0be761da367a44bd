use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{TokenMetadata, TradeEvent};
use crate::error::MintscoreError;
use crate::model::TrainingReport;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub trades: Vec<TradeEvent>,
    pub tokens: Vec<TokenMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub trades: Vec<TradeEvent>,
    pub token: TokenMetadata,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: String,
    pub report: TrainingReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatusResponse {
    pub trained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Wrapper mapping core errors onto HTTP responses. Client-side failures
/// become 400s with the message in `detail`; everything else is a 500.
#[derive(Debug)]
pub struct ApiError(pub MintscoreError);

impl From<MintscoreError> for ApiError {
    fn from(err: MintscoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}
