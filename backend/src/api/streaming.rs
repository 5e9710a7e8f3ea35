//! Streaming utilities for Server-Sent Events (SSE)
//!
//! A submission is streamed as its turns: the user turn right away, the
//! response turn once the orchestrator finishes, then the done signal.

use crate::error::AppError;
use crate::orchestrator::constants::{SSE_DONE_SIGNAL, SSE_ERROR_PREFIX};
use crate::session::ConversationTurn;
use anyhow::anyhow;
use async_stream::stream;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use futures_util::{stream::Stream, StreamExt};
use tokio::task::JoinHandle;

fn turn_event(turn: &ConversationTurn) -> Result<String, axum::Error> {
    serde_json::to_string(turn).map_err(axum::Error::new)
}

/// Stream of serialized turns for one submission
///
/// # Arguments
/// * `user_turn` - Turn appended when the submission began
/// * `response` - Background task appending the response turn
pub fn turn_stream(
    user_turn: ConversationTurn,
    response: JoinHandle<ConversationTurn>,
) -> impl Stream<Item = Result<String, axum::Error>> + Send + 'static {
    stream! {
        yield turn_event(&user_turn);

        match response.await {
            Ok(turn) => {
                yield turn_event(&turn);
            }
            Err(e) => {
                tracing::error!(error = %e, "Submission task failed");
                yield Err(axum::Error::new(e));
            }
        }

        yield Ok(SSE_DONE_SIGNAL.to_string());
    }
}

/// Wrap a stream of events into an SSE HTTP response
///
/// # Returns
/// * `Result<Response, AppError>` - SSE HTTP response or error
pub fn sse_response(
    events: impl Stream<Item = Result<String, axum::Error>> + Send + 'static,
) -> Result<Response, AppError> {
    let sse_stream = events.map(|event_result| {
        let sse_text = match event_result {
            Ok(data) => format!("data: {}\n\n", data),
            Err(e) => format!("data: {} {}\n\n", SSE_ERROR_PREFIX, e),
        };
        Ok::<_, std::io::Error>(sse_text)
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow!("Failed to build SSE response: {}", e)))
}
