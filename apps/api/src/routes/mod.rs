pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::submission::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/queue", post(handlers::handle_submit))
        .route("/api/stats", get(handlers::handle_stats))
        .with_state(state)
}
