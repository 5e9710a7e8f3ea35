// Application state management
// Holds the orchestrator (when a credential is configured) and the session

use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorError};
use crate::session::SessionController;
use std::sync::Arc;

/// Main application state
///
/// Shared by every handler through `Arc<AppState>`.
pub struct AppState {
    /// Orchestrator; `None` when no credential is configured
    orchestrator: Option<Arc<Orchestrator>>,
    /// Effective orchestrator configuration
    config: OrchestratorConfig,
    /// Session-local conversation
    pub session: SessionController,
}

impl AppState {
    /// Build state from application config
    ///
    /// A missing credential is tolerated here: the server starts and every
    /// operation answers with a missing-credential error.
    ///
    /// # Errors
    /// * Invalid orchestrator configuration
    /// * The HTTP client could not be constructed
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        config.orchestrator.validate()?;

        let orchestrator =
            match Orchestrator::with_gemini(&config.gemini, config.orchestrator.clone()) {
                Ok(orchestrator) => Some(Arc::new(orchestrator)),
                Err(OrchestratorError::MissingCredential) => {
                    tracing::warn!(
                        "GEMINI_API_KEY is not set; all generation requests will be rejected"
                    );
                    None
                }
                Err(e) => return Err(e.into()),
            };

        Ok(Self {
            orchestrator,
            config: config.orchestrator.clone(),
            session: SessionController::new(),
        })
    }

    /// Build state around an existing orchestrator
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self {
            config: orchestrator.config().clone(),
            orchestrator: Some(Arc::new(orchestrator)),
            session: SessionController::new(),
        }
    }

    /// Build state without a credential
    pub fn without_credential(config: OrchestratorConfig) -> Self {
        Self {
            orchestrator: None,
            config,
            session: SessionController::new(),
        }
    }

    /// Orchestrator, or a missing-credential error raised before any call
    pub fn orchestrator(&self) -> Result<Arc<Orchestrator>, AppError> {
        self.orchestrator
            .clone()
            .ok_or(AppError::MissingCredential)
    }

    /// Effective orchestrator configuration
    pub fn orchestrator_config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Cancel outstanding intents (used on shutdown)
    pub fn shutdown(&self) {
        if let Some(orchestrator) = &self.orchestrator {
            orchestrator.shutdown();
        }
    }
}
