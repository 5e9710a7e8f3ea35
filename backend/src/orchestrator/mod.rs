//! Orchestrator module
//!
//! Turns user intents into Gemini calls: picks candidate models, classifies
//! failures, and retries or falls back according to a per-intent policy.

pub mod api_client;
pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod gemini_types;
pub mod intent;
pub mod policy;
pub mod retry;
pub mod service;

pub use api_client::{BackendFailure, GeminiClient, GenerativeBackend};
pub use classify::{ClassifiedError, ErrorKind};
pub use config::OrchestratorConfig;
pub use error::OrchestratorError;
pub use intent::{ImagePayload, ImageResult, Intent, IntentKind, IntentOutcome};
pub use service::Orchestrator;
