//! Orchestrator configuration
//!
//! Model candidate lists, retry timings and the per-intent time budget.

use crate::error::AppError;
use crate::orchestrator::constants::{
    DEFAULT_ANALYSIS_MODELS, DEFAULT_CHAT_MODELS, DEFAULT_EDIT_MODEL, DEFAULT_GENERATION_MODEL,
    DEFAULT_REQUEST_DEADLINE_SECS, EDIT_MAX_ATTEMPTS, EDIT_RETRY_DELAY_MS,
    GENERATION_BACKOFF_STEP_MS, GENERATION_MAX_RETRIES, MAX_REQUEST_DEADLINE_SECS,
    MODEL_FALLBACK_DELAY_MS,
};
use crate::orchestrator::policy::{Backoff, RetryPolicy};
use serde::Serialize;
use std::env;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestratorConfig {
    /// Chat candidates, tried in order
    pub chat_models: Vec<String>,
    /// Image analysis candidates, tried in order
    pub analysis_models: Vec<String>,
    /// Model used for image edits
    pub edit_model: String,
    /// Model used for image generation
    pub generation_model: String,
    /// Delay between chat/analysis model attempts (milliseconds)
    pub fallback_delay_ms: u64,
    /// Total attempts for an image edit
    pub edit_max_attempts: u32,
    /// Delay between image edit attempts (milliseconds)
    pub edit_retry_delay_ms: u64,
    /// Retries after the first image generation attempt
    pub generation_max_retries: u32,
    /// Linear backoff step for image generation (milliseconds)
    pub generation_backoff_step_ms: u64,
    /// Total time budget per intent in seconds (`None` disables it)
    pub request_deadline_secs: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            chat_models: DEFAULT_CHAT_MODELS.iter().map(|m| m.to_string()).collect(),
            analysis_models: DEFAULT_ANALYSIS_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            fallback_delay_ms: MODEL_FALLBACK_DELAY_MS,
            edit_max_attempts: EDIT_MAX_ATTEMPTS,
            edit_retry_delay_ms: EDIT_RETRY_DELAY_MS,
            generation_max_retries: GENERATION_MAX_RETRIES,
            generation_backoff_step_ms: GENERATION_BACKOFF_STEP_MS,
            request_deadline_secs: Some(DEFAULT_REQUEST_DEADLINE_SECS),
        }
    }
}

/// Parse a comma-separated model list, dropping blank entries
fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl OrchestratorConfig {
    /// Load overrides from environment variables on top of the defaults
    ///
    /// Recognised variables: `CHAT_MODELS`, `ANALYSIS_MODELS` (comma-separated),
    /// `EDIT_MODEL`, `GENERATION_MODEL`, `REQUEST_DEADLINE_SECS` (`0` disables
    /// the budget).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var("CHAT_MODELS") {
            let models = parse_model_list(&raw);
            if !models.is_empty() {
                config.chat_models = models;
            }
        }
        if let Ok(raw) = env::var("ANALYSIS_MODELS") {
            let models = parse_model_list(&raw);
            if !models.is_empty() {
                config.analysis_models = models;
            }
        }
        if let Ok(model) = env::var("EDIT_MODEL") {
            if !model.trim().is_empty() {
                config.edit_model = model.trim().to_string();
            }
        }
        if let Ok(model) = env::var("GENERATION_MODEL") {
            if !model.trim().is_empty() {
                config.generation_model = model.trim().to_string();
            }
        }
        if let Some(secs) = env::var("REQUEST_DEADLINE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.request_deadline_secs = (secs > 0).then_some(secs);
        }

        config
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Ok(())` - Configuration is usable
    /// * `Err(AppError)` - A candidate list is empty, a model id is blank,
    ///   an attempt count is zero, or the deadline exceeds
    ///   `MAX_REQUEST_DEADLINE_SECS`
    pub fn validate(&self) -> Result<(), AppError> {
        if self.chat_models.is_empty() {
            return Err(AppError::InvalidConfig(
                "chat_models cannot be empty".to_string(),
            ));
        }
        if self.analysis_models.is_empty() {
            return Err(AppError::InvalidConfig(
                "analysis_models cannot be empty".to_string(),
            ));
        }
        let all_models = self
            .chat_models
            .iter()
            .chain(self.analysis_models.iter())
            .chain([&self.edit_model, &self.generation_model]);
        for model in all_models {
            if model.trim().is_empty() {
                return Err(AppError::InvalidConfig(
                    "model identifiers cannot be blank".to_string(),
                ));
            }
        }
        if self.edit_max_attempts == 0 {
            return Err(AppError::InvalidConfig(
                "edit_max_attempts must be > 0".to_string(),
            ));
        }
        if let Some(secs) = self.request_deadline_secs {
            if secs > MAX_REQUEST_DEADLINE_SECS {
                return Err(AppError::InvalidConfig(format!(
                    "request_deadline_secs must be at most {}",
                    MAX_REQUEST_DEADLINE_SECS
                )));
            }
        }
        Ok(())
    }

    /// Policy for plain chat: fall back across the chat candidates
    pub fn chat_policy(&self) -> RetryPolicy {
        RetryPolicy::model_fallback(
            self.chat_models.len(),
            Duration::from_millis(self.fallback_delay_ms),
        )
    }

    /// Policy for image analysis: fall back across the analysis candidates
    pub fn analysis_policy(&self) -> RetryPolicy {
        RetryPolicy::model_fallback(
            self.analysis_models.len(),
            Duration::from_millis(self.fallback_delay_ms),
        )
    }

    /// Policy for image edits: bounded attempts on one model, flat delay
    pub fn edit_policy(&self) -> RetryPolicy {
        RetryPolicy::same_model(
            self.edit_max_attempts,
            Backoff::Flat(Duration::from_millis(self.edit_retry_delay_ms)),
        )
    }

    /// Policy for image generation: one model, linearly growing delay
    pub fn generation_policy(&self) -> RetryPolicy {
        RetryPolicy::same_model(
            self.generation_max_retries.saturating_add(1),
            Backoff::Linear {
                step: Duration::from_millis(self.generation_backoff_step_ms),
            },
        )
    }

    /// Total time budget per intent
    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::policy::Advance;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OrchestratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_chat_models() {
        let config = OrchestratorConfig {
            chat_models: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chat_models"));
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let config = OrchestratorConfig {
            edit_model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_request_deadline() {
        let huge = OrchestratorConfig {
            request_deadline_secs: Some(u64::MAX),
            ..Default::default()
        };
        let err = huge.validate().unwrap_err();
        assert!(err.to_string().contains("request_deadline_secs"));

        let at_limit = OrchestratorConfig {
            request_deadline_secs: Some(MAX_REQUEST_DEADLINE_SECS),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let disabled = OrchestratorConfig {
            request_deadline_secs: None,
            ..Default::default()
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_policies_follow_config() {
        let config = OrchestratorConfig::default();

        let chat = config.chat_policy();
        assert_eq!(chat.max_attempts, 3);
        assert_eq!(chat.advance, Advance::NextCandidate);
        assert_eq!(chat.backoff, Backoff::Flat(Duration::from_millis(1000)));

        assert_eq!(config.analysis_policy().max_attempts, 2);

        let edit = config.edit_policy();
        assert_eq!(edit.max_attempts, 2);
        assert_eq!(edit.advance, Advance::SameModel);
        assert_eq!(edit.backoff.delay_after(0), Duration::from_millis(2000));

        let generation = config.generation_policy();
        assert_eq!(generation.max_attempts, 6);
        assert_eq!(generation.backoff.delay_after(4), Duration::from_millis(10000));
    }

    #[test]
    fn test_parse_model_list_skips_blanks() {
        assert_eq!(
            parse_model_list(" a , ,b,"),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
