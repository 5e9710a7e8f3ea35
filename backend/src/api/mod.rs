//! API module
//!
//! Contains HTTP request handlers for the orchestrator and the session

pub mod intents;
pub mod session;
pub mod session_multipart;
pub mod streaming;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use utils::RouterState;

/// Request body limit; leaves room for a base64-encoded maximum-size image
const BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

/// Build the API routes over shared state
pub fn router(state: RouterState) -> Router {
    Router::new()
        .route("/api/config", get(intents::get_config))
        // Orchestrator operations
        .route("/api/chat", post(intents::chat))
        .route("/api/images/analyze", post(intents::analyze_image))
        .route("/api/images/edit", post(intents::edit_image))
        .route("/api/images/generate", post(intents::generate_image))
        // Session
        .route("/api/session", delete(session::clear_session))
        .route("/api/session/turns", get(session::list_turns))
        .route("/api/session/submit", post(session::submit))
        .route(
            "/api/session/submit/multipart",
            post(session_multipart::submit_multipart),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
