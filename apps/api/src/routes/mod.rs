pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::parsing::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API: upload → preview, then an explicit parse request
        .route("/api/v1/resumes/preview", post(handlers::handle_preview))
        .route("/api/v1/resumes/parse", post(handlers::handle_parse))
        // Uploads are not size-limited
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
