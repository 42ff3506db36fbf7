pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::jobs::ws;
use crate::state::AppState;

/// Uploaded résumés are small; 10 MiB leaves generous headroom.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/analyze-resume",
            post(handlers::handle_analyze_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/ats-response/:user_id",
            get(handlers::handle_get_ats_response),
        )
        .route("/job-data/:user_id", get(handlers::handle_get_job_data))
        .route(
            "/sharable-resume/:resume_id",
            get(handlers::handle_get_sharable_resume),
        )
        .route("/ws/:client_id", get(ws::ws_handler))
        .with_state(state)
}
