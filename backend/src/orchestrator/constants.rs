//! Orchestrator constants
//!
//! Centralized constants used throughout the orchestrator module.

/// Default Gemini API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Chat candidates, tried in order
pub const DEFAULT_CHAT_MODELS: &[&str] =
    &["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.0-flash-lite"];

/// Image analysis candidates, tried in order
pub const DEFAULT_ANALYSIS_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.0-flash"];

/// Single model used for image edits
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Single model used for image generation
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Delay between chat/analysis model attempts
pub const MODEL_FALLBACK_DELAY_MS: u64 = 1_000;

/// Total attempts for an image edit
pub const EDIT_MAX_ATTEMPTS: u32 = 2;

/// Delay between image edit attempts
pub const EDIT_RETRY_DELAY_MS: u64 = 2_000;

/// Retries after the first image generation attempt
pub const GENERATION_MAX_RETRIES: u32 = 5;

/// Linear step of the image generation backoff
pub const GENERATION_BACKOFF_STEP_MS: u64 = 2_000;

/// Default total time budget per intent
pub const DEFAULT_REQUEST_DEADLINE_SECS: u64 = 120;

/// Largest accepted total time budget per intent
pub const MAX_REQUEST_DEADLINE_SECS: u64 = 24 * 60 * 60;

/// Instruction used when an analysis request carries no text
pub const DEFAULT_ANALYSIS_INSTRUCTION: &str = "Analyze this image in detail.";

/// Output modalities requested for image edit/generation
pub const IMAGE_RESPONSE_MODALITIES: &[&str] = &["TEXT", "IMAGE"];

/// SSE stream termination signal
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

/// SSE error prefix
pub const SSE_ERROR_PREFIX: &str = "[ERROR]";
