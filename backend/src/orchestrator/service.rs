//! Request orchestrator
//!
//! Owns the backend client and exposes one operation per intent kind. Each
//! operation is a thin instantiation of [`attempt_with_policy`].

use crate::config::GeminiConfig;
use crate::orchestrator::api_client::{GeminiClient, GenerativeBackend};
use crate::orchestrator::config::OrchestratorConfig;
use crate::orchestrator::error::OrchestratorError;
use crate::orchestrator::extract::{extract_image_result, extract_text};
use crate::orchestrator::intent::{
    analysis_request, chat_request, edit_request, generation_request, ImagePayload, ImageResult,
    Intent, IntentOutcome,
};
use crate::orchestrator::retry::{attempt_with_policy, CallPlan};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Request orchestrator
///
/// Calls are independent: no state survives between intents apart from the
/// configuration and the shutdown token.
pub struct Orchestrator {
    backend: Arc<dyn GenerativeBackend>,
    config: OrchestratorConfig,
    shutdown: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator over an explicitly constructed backend
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: OrchestratorConfig) -> Self {
        Self {
            backend,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Create an orchestrator backed by the Gemini HTTP client
    ///
    /// # Errors
    /// * `OrchestratorError::MissingCredential` if no API key is configured
    pub fn with_gemini(
        gemini: &GeminiConfig,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        let client = GeminiClient::from_config(gemini)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Active configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Token for one intent; cancelled together with [`Orchestrator::shutdown`]
    pub fn intent_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancel every outstanding intent at its next suspension point
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Plain chat with model fallback
    pub async fn chat(&self, message: &str) -> Result<String, OrchestratorError> {
        self.chat_with(message, &self.intent_token()).await
    }

    /// Image analysis with model fallback
    pub async fn analyze_image(
        &self,
        image: &ImagePayload,
        text: &str,
    ) -> Result<String, OrchestratorError> {
        self.analyze_image_with(image, text, &self.intent_token())
            .await
    }

    /// Image edit with bounded same-model retries
    pub async fn edit_image(
        &self,
        image: &ImagePayload,
        text: &str,
    ) -> Result<ImageResult, OrchestratorError> {
        self.edit_image_with(image, text, &self.intent_token()).await
    }

    /// Image generation with linear backoff on one model
    pub async fn generate_image(&self, text: &str) -> Result<ImageResult, OrchestratorError> {
        self.generate_image_with(text, &self.intent_token()).await
    }

    /// Dispatch an intent under an explicit cancellation token
    pub async fn run(
        &self,
        intent: &Intent,
        cancel: &CancellationToken,
    ) -> Result<IntentOutcome, OrchestratorError> {
        tracing::debug!(intent = intent.kind().as_str(), "Running intent");
        match intent {
            Intent::Chat { text } => self.chat_with(text, cancel).await.map(IntentOutcome::Text),
            Intent::AnalyzeImage { image, text } => self
                .analyze_image_with(image, text, cancel)
                .await
                .map(IntentOutcome::Text),
            Intent::EditImage { image, text } => self
                .edit_image_with(image, text, cancel)
                .await
                .map(IntentOutcome::Image),
            Intent::GenerateImage { text } => self
                .generate_image_with(text, cancel)
                .await
                .map(IntentOutcome::Image),
        }
    }

    async fn chat_with(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String, OrchestratorError> {
        let plan = CallPlan {
            label: "chat",
            candidates: &self.config.chat_models,
            policy: self.config.chat_policy(),
            deadline: self.config.request_deadline(),
        };
        attempt_with_policy(
            self.backend.as_ref(),
            plan,
            &chat_request(message),
            extract_text,
            cancel,
        )
        .await
    }

    async fn analyze_image_with(
        &self,
        image: &ImagePayload,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, OrchestratorError> {
        let plan = CallPlan {
            label: "analyze",
            candidates: &self.config.analysis_models,
            policy: self.config.analysis_policy(),
            deadline: self.config.request_deadline(),
        };
        attempt_with_policy(
            self.backend.as_ref(),
            plan,
            &analysis_request(image, text),
            extract_text,
            cancel,
        )
        .await
    }

    async fn edit_image_with(
        &self,
        image: &ImagePayload,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageResult, OrchestratorError> {
        let candidates = std::slice::from_ref(&self.config.edit_model);
        let plan = CallPlan {
            label: "edit",
            candidates,
            policy: self.config.edit_policy(),
            deadline: self.config.request_deadline(),
        };
        attempt_with_policy(
            self.backend.as_ref(),
            plan,
            &edit_request(image, text),
            extract_image_result,
            cancel,
        )
        .await
    }

    async fn generate_image_with(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageResult, OrchestratorError> {
        let candidates = std::slice::from_ref(&self.config.generation_model);
        let plan = CallPlan {
            label: "generate",
            candidates,
            policy: self.config.generation_policy(),
            deadline: self.config.request_deadline(),
        };
        attempt_with_policy(
            self.backend.as_ref(),
            plan,
            &generation_request(text),
            extract_image_result,
            cancel,
        )
        .await
    }
}
