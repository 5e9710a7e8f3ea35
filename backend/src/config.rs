//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::orchestrator::config::OrchestratorConfig;
use crate::orchestrator::constants::GEMINI_API_BASE_URL;
use std::env;
use std::fmt;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Gemini backend configuration
    pub gemini: GeminiConfig,
    /// Model candidates, retry timings and request budget
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Gemini backend configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; operations fail with a missing-credential error without it
    pub api_key: Option<String>,
    /// API base URL
    pub api_base_url: String,
    /// Per-call HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: GEMINI_API_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                api_base_url: env::var("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|_| GEMINI_API_BASE_URL.to_string()),
                timeout_secs: env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(60),
            },
            orchestrator: OrchestratorConfig::from_env(),
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
