//! Error types and error handling for the application
//!
//! This module defines the HTTP-facing error type. All errors implement
//! `IntoResponse` to provide consistent error formatting.

use crate::orchestrator::{ErrorKind, OrchestratorError};
use axum::{
    extract::rejection::JsonRejection,
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body or submission is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Attached payload exceeds the size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No Gemini credential is configured
    #[error("Gemini API key is not configured (set GEMINI_API_KEY)")]
    MissingCredential,

    /// Another submission is still outstanding for this session
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Orchestrated intent failed
    #[error("{0}")]
    Orchestration(#[from] OrchestratorError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// HTTP status for a classified backend failure
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
        ErrorKind::SafetyError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::NetworkError | ErrorKind::EmptyResponse | ErrorKind::NoCandidates => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    /// HTTP status and machine-readable kind for this error
    pub fn status_and_kind(&self) -> (StatusCode, Option<&'static str>) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, None),
            AppError::InvalidConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::MissingCredential => {
                (StatusCode::SERVICE_UNAVAILABLE, Some("MISSING_CREDENTIAL"))
            }
            AppError::SubmissionInFlight => (StatusCode::CONFLICT, None),
            AppError::Orchestration(err) => match err {
                OrchestratorError::MissingCredential => {
                    (StatusCode::SERVICE_UNAVAILABLE, Some("MISSING_CREDENTIAL"))
                }
                OrchestratorError::Initialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
                OrchestratorError::Classified(classified) => (
                    status_for_kind(classified.kind),
                    Some(classified.kind.as_str()),
                ),
                OrchestratorError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, Some("CANCELLED")),
                OrchestratorError::DeadlineExceeded { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, Some("DEADLINE_EXCEEDED"))
                }
            },
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": kind,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ClassifiedError;

    #[test]
    fn test_classified_errors_map_to_status() {
        let err = AppError::from(OrchestratorError::Classified(ClassifiedError::no_candidates(
            "m",
        )));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::BAD_GATEWAY, Some("NO_CANDIDATES"))
        );

        assert_eq!(
            status_for_kind(ErrorKind::RateLimit),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(status_for_kind(ErrorKind::AuthError), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_credential_is_service_unavailable() {
        let direct = AppError::MissingCredential.status_and_kind();
        let wrapped = AppError::from(OrchestratorError::MissingCredential).status_and_kind();
        assert_eq!(direct, wrapped);
        assert_eq!(direct.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_json_rejection_becomes_json_bad_request() {
        use axum::extract::FromRequest;

        #[derive(Debug, serde::Deserialize)]
        struct Body {
            #[allow(dead_code)]
            message: String,
        }

        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let rejection = Json::<Body>::from_request(request, &()).await.unwrap_err();

        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], 400);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[test]
    fn test_busy_is_conflict() {
        assert_eq!(
            AppError::SubmissionInFlight.status_and_kind().0,
            StatusCode::CONFLICT
        );
    }
}
