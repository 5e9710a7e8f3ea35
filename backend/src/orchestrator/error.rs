//! Orchestrator error types
//!
//! Errors an orchestrated intent can end with. Backend failures arrive here
//! already classified; the remaining variants are orchestration-level
//! conditions that never reach the backend classifier.

use crate::orchestrator::classify::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Terminal failure of an orchestrated intent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    /// No credential configured; raised before any network attempt
    #[error("Gemini API key is not configured (set GEMINI_API_KEY)")]
    MissingCredential,

    /// The backend client could not be constructed
    #[error("Failed to initialize Gemini client: {0}")]
    Initialization(String),

    /// A classified backend failure
    #[error("{0}")]
    Classified(#[from] ClassifiedError),

    /// The intent was cancelled at a suspension point
    #[error("Request was cancelled")]
    Cancelled,

    /// The total time budget for the intent ran out
    #[error("Request exceeded its time budget of {budget_ms} ms")]
    DeadlineExceeded {
        /// Budget that was exceeded, in milliseconds
        budget_ms: u64,
        /// Last classified failure seen before the budget ran out
        last: Option<ClassifiedError>,
    },
}

impl OrchestratorError {
    /// Classified kind, when the error came from the backend
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            OrchestratorError::Classified(err) => Some(err.kind),
            OrchestratorError::DeadlineExceeded { last, .. } => last.as_ref().map(|e| e.kind),
            _ => None,
        }
    }
}
