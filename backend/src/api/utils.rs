//! API utility functions
//!
//! Shared router state and the submission flow used by both the JSON and
//! multipart session endpoints.

use crate::api::streaming::{sse_response, turn_stream};
use crate::error::AppError;
use crate::session::Submission;
use crate::state::AppState;
use axum::response::Response;
use std::sync::Arc;

/// State handed to every handler
pub type RouterState = Arc<AppState>;

/// Begin a submission and stream its turns
///
/// The credential is checked before anything is appended, so a missing key
/// never leaves a dangling user turn behind.
pub async fn submit_and_stream(
    state: &RouterState,
    submission: Submission,
) -> Result<Response, AppError> {
    let orchestrator = state.orchestrator()?;
    let (user_turn, pending) = state.session.begin(submission).await?;
    let response = pending.spawn(orchestrator);
    sse_response(turn_stream(user_turn, response))
}
