pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ats::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring API
        .route("/api/v1/ats/score", post(handlers::handle_score))
        .route("/api/v1/ats/weights", post(handlers::handle_weight_change))
        .route(
            "/api/v1/ats/weights/reset",
            post(handlers::handle_reset_weights),
        )
        // Persisted scores
        .route(
            "/api/v1/analysis/set-score",
            post(handlers::handle_set_score),
        )
        .route("/api/v1/analysis/score", get(handlers::handle_get_score))
        .with_state(state)
}
