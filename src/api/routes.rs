use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/train", post(handlers::train_model))
        .route("/api/predict", post(handlers::predict_token))
        .route("/api/model", get(handlers::model_status))
        .with_state(state)
        .layer(cors)
}
