//! Backend failure classification
//!
//! Every raw failure coming back from the generative backend is classified
//! exactly once. The same classification decides whether the failure is
//! retriable (only `RATE_LIMIT` is) and what the caller eventually sees.

use crate::orchestrator::api_client::BackendFailure;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Classified kind of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Credential rejected by the backend
    AuthError,
    /// Prompt or output blocked by safety filters
    SafetyError,
    /// Rate limit or quota exhausted
    RateLimit,
    /// Transport-level failure reaching the backend
    NetworkError,
    /// Response carried no textual content
    EmptyResponse,
    /// Response carried zero result candidates
    NoCandidates,
    /// Anything else
    UnknownError,
}

impl ErrorKind {
    /// Wire representation of the kind (e.g. `"RATE_LIMIT"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::SafetyError => "SAFETY_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::NoCandidates => "NO_CANDIDATES",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend failure after classification
///
/// Carries a human-readable message suitable for display, the classified
/// kind, and the raw failure details for logging.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct ClassifiedError {
    /// Human-readable message
    pub message: String,
    /// Classified kind
    pub kind: ErrorKind,
    /// Raw failure details (message, status, model)
    pub raw_details: serde_json::Value,
}

impl ClassifiedError {
    /// Response from `model` carried no textual content
    pub fn empty_response(model: &str) -> Self {
        Self {
            message: "The model returned an empty response. Please try again.".to_string(),
            kind: ErrorKind::EmptyResponse,
            raw_details: json!({ "model": model }),
        }
    }

    /// Response from `model` carried zero result candidates
    pub fn no_candidates(model: &str) -> Self {
        Self {
            message: "The model returned no results. Try a different prompt.".to_string(),
            kind: ErrorKind::NoCandidates,
            raw_details: json!({ "model": model }),
        }
    }
}

/// Result of classifying one raw failure
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Whether the retry policy may try again
    pub retriable: bool,
    /// The classified error surfaced when no retry happens
    pub error: ClassifiedError,
}

const AUTH_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "api key format",
];
const SAFETY_MARKERS: &[&str] = &["safety", "blocked"];
const RATE_LIMIT_MARKERS: &[&str] = &["429", "quota", "rate limit", "resource_exhausted"];
const NETWORK_MARKERS: &[&str] = &["network", "fetch", "connection"];

fn mentions_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| haystack.contains(marker))
}

/// Classify a raw backend failure
///
/// Rules are applied in order: credential markers, safety markers, rate
/// limit (status 429 or quota/429/"rate limit" in the message), network
/// markers, and finally `UNKNOWN_ERROR` carrying the original message.
pub fn classify(failure: &BackendFailure) -> Classification {
    let lowered = failure.message.to_lowercase();

    let (kind, message) = if mentions_any(&lowered, AUTH_MARKERS) {
        (
            ErrorKind::AuthError,
            "Invalid API key. Please check your Gemini API key configuration.".to_string(),
        )
    } else if mentions_any(&lowered, SAFETY_MARKERS) {
        (
            ErrorKind::SafetyError,
            "The request was blocked by safety filters. Try rephrasing your prompt.".to_string(),
        )
    } else if failure.status == Some(429) || mentions_any(&lowered, RATE_LIMIT_MARKERS) {
        (
            ErrorKind::RateLimit,
            "Rate limit exceeded. Please wait a moment and try again.".to_string(),
        )
    } else if mentions_any(&lowered, NETWORK_MARKERS) {
        (
            ErrorKind::NetworkError,
            "Network error while contacting the model. Please check your connection.".to_string(),
        )
    } else {
        (ErrorKind::UnknownError, failure.message.clone())
    };

    Classification {
        retriable: kind == ErrorKind::RateLimit,
        error: ClassifiedError {
            message,
            kind,
            raw_details: json!({
                "message": failure.message,
                "status": failure.status,
                "body": failure.body,
            }),
        },
    }
}
