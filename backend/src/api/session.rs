//! Session API endpoints
//!
//! The UI-facing flow: submit text and an optional image, receive the
//! resulting turns as an SSE stream, and read back the session.

use crate::api::utils::{submit_and_stream, RouterState};
use crate::error::AppError;
use crate::session::{ConversationTurn, Submission};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    Json,
};

/// GET /api/session/turns - List turns in insertion order
pub async fn list_turns(State(state): State<RouterState>) -> Json<Vec<ConversationTurn>> {
    Json(state.session.turns().await)
}

/// DELETE /api/session - Drop all turns and the active image
pub async fn clear_session(State(state): State<RouterState>) -> Result<StatusCode, AppError> {
    state.session.clear().await?;
    tracing::info!("Session cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/session/submit - Submit text and an optional image (JSON)
///
/// Streams the user turn, then exactly one assistant or error turn, then
/// `[DONE]`.
pub async fn submit(
    State(state): State<RouterState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(submission) = payload?;
    submit_and_stream(&state, submission).await
}
