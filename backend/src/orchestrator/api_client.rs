//! Gemini API client
//!
//! Direct HTTP client for calling the Gemini `generateContent` endpoint.
//! The orchestrator talks to it through the [`GenerativeBackend`] trait so
//! the retry logic can be exercised against scripted backends in tests.

use crate::config::GeminiConfig;
use crate::orchestrator::error::OrchestratorError;
use crate::orchestrator::gemini_types::{GeminiApiRequest, GeminiApiResponse};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Raw failure reported by the generative backend, before classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendFailure {
    /// Failure message as reported by the backend or transport
    pub message: String,
    /// HTTP status, when the backend answered at all
    pub status: Option<u16>,
    /// Unparsed response body; kept for diagnostics, never classified
    pub body: Option<String>,
}

impl BackendFailure {
    /// Create a failure from a message and optional HTTP status
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
            body: None,
        }
    }

    /// Attach the raw response body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A backend able to answer `generateContent` calls
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Issue a single call against `model`
    async fn generate_content(
        &self,
        model: &str,
        request: &GeminiApiRequest,
    ) -> Result<GeminiApiResponse, BackendFailure>;
}

/// Error envelope returned by the Gemini API on non-2xx responses
#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Explicitly owned Gemini HTTP client
///
/// The credential is validated once here, so a constructed client always
/// carries a non-blank key.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from a credential, base URL and per-call timeout
    ///
    /// # Errors
    /// * `OrchestratorError::MissingCredential` if the key is absent or blank
    /// * `OrchestratorError::Initialization` if the HTTP client cannot be built
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, OrchestratorError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(OrchestratorError::MissingCredential)?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrchestratorError::Initialization(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from the Gemini section of the application config
    pub fn from_config(config: &GeminiConfig) -> Result<Self, OrchestratorError> {
        Self::new(
            config.api_key.as_deref(),
            &config.api_base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GeminiApiRequest,
    ) -> Result<GeminiApiResponse, BackendFailure> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!(url = %url, model = %model, "Calling Gemini API");

        // Make POST request using shared client (connection pooling)
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                BackendFailure::new(
                    format!("Network error: fetch to Gemini API failed: {}", e),
                    None,
                )
            })?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| {
            BackendFailure::new(
                format!("Network error: failed to read Gemini API response: {}", e),
                Some(status.as_u16()),
            )
        })?;

        if !status.is_success() {
            let status_code = status.as_u16();
            tracing::warn!(
                status_code = status_code,
                model = %model,
                error_body = %response_body,
                "Gemini API returned error status"
            );

            let failure = match serde_json::from_str::<ApiErrorEnvelope>(&response_body) {
                Ok(envelope) => {
                    let message = match envelope.error.status {
                        Some(api_status) => {
                            format!("{} [{}]", envelope.error.message, api_status)
                        }
                        None => envelope.error.message,
                    };
                    BackendFailure::new(message, Some(status_code))
                }
                Err(_) => BackendFailure::new(
                    format!("Gemini API returned error status {}", status_code),
                    Some(status_code),
                )
                .with_body(response_body),
            };
            return Err(failure);
        }

        let parsed: GeminiApiResponse = match serde_json::from_str(&response_body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    model = %model,
                    error = %e,
                    body = %response_body,
                    "Gemini API response is not valid JSON"
                );
                return Err(BackendFailure::new(
                    format!("Failed to parse JSON response from Gemini API: {}", e),
                    Some(status.as_u16()),
                )
                .with_body(response_body));
            }
        };

        // Check for blocked prompt
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(BackendFailure::new(
                format!("Prompt blocked: {}", reason),
                Some(status.as_u16()),
            ));
        }

        tracing::debug!(
            model = %model,
            candidates = parsed.candidates.len(),
            "Received response from Gemini API"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::classify::{classify, ErrorKind};
    use crate::orchestrator::gemini_types::{RequestContent, RequestPart};
    use mockito::{Matcher, Server};
    use serial_test::serial;

    fn text_request(text: &str) -> GeminiApiRequest {
        GeminiApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::Text {
                    text: text.to_string(),
                }],
            }],
            generation_config: None,
        }
    }

    fn client_for(base_url: &str) -> GeminiClient {
        GeminiClient::new(Some("test-key"), base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_new_rejects_missing_or_blank_key() {
        let missing = GeminiClient::new(None, "http://localhost", Duration::from_secs(1));
        assert_eq!(missing.unwrap_err(), OrchestratorError::MissingCredential);

        let blank = GeminiClient::new(Some("   "), "http://localhost", Duration::from_secs(1));
        assert_eq!(blank.unwrap_err(), OrchestratorError::MissingCredential);
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": "test prompt"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{"text": "This is a test response"}],
                            "role": "model"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client
            .generate_content("gemini-2.5-flash", &text_request("test prompt"))
            .await;

        mock.assert_async().await;
        let response = result.unwrap();
        assert_eq!(response.text().as_deref(), Some("This is a test response"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_rate_limit_keeps_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(
                r#"{"error": {"code": 429, "message": "You exceeded your current quota", "status": "RESOURCE_EXHAUSTED"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.status, Some(429));
        assert!(failure.message.contains("quota"));
        assert!(failure.message.contains("RESOURCE_EXHAUSTED"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_unstructured_error_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.status, Some(503));
        assert_eq!(failure.message, "Gemini API returned error status 503");
        assert_eq!(failure.body.as_deref(), Some("Service Unavailable"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_blocked_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.message, "Prompt blocked: SAFETY");
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_invalid_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("This is not JSON")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(failure.message.contains("Failed to parse JSON"));
        assert_eq!(failure.body.as_deref(), Some("This is not JSON"));
    }

    #[tokio::test]
    #[serial]
    async fn test_truncated_body_does_not_drive_classification() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[{"safetyRatings":[{"category":"HARM_CATEGORY_HARASSMENT","blocked":false}]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(!failure.message.contains("safetyRatings"));
        assert!(failure.body.as_deref().unwrap().contains("safetyRatings"));

        let classified = classify(&failure).error;
        assert_eq!(classified.kind, ErrorKind::UnknownError);
        assert!(classified.raw_details["body"]
            .as_str()
            .unwrap()
            .contains("safetyRatings"));
    }

    #[tokio::test]
    #[serial]
    async fn test_html_error_page_does_not_drive_classification() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("<html><body>Request blocked: fetch failed upstream</body></html>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(classify(&failure).error.kind, ErrorKind::UnknownError);
    }

    #[tokio::test]
    async fn test_generate_content_unreachable_host_is_network_failure() {
        // Nothing listens on port 9 locally; the connection is refused.
        let client = client_for("http://127.0.0.1:9");
        let failure = client
            .generate_content("gemini-2.5-flash", &text_request("hi"))
            .await
            .unwrap_err();

        assert_eq!(failure.status, None);
        assert!(failure.message.starts_with("Network error"));
    }
}
