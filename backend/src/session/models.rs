//! Session data models
//!
//! Conversation turns and user submissions.

use crate::error::AppError;
use crate::orchestrator::{ErrorKind, ImagePayload, Intent, IntentKind, OrchestratorError};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Maximum prompt length in characters
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Maximum accepted image size in bytes
pub const MAX_IMAGE_BYTES: usize = 7 * 1024 * 1024;

/// Role of a turn's author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Turn submitted by the user
    User,
    /// Turn produced from the orchestrator's result
    Assistant,
}

/// A single turn of the conversation
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    /// Unique identifier for the turn
    pub id: String,
    /// Author of the turn
    pub role: TurnRole,
    /// Text content (or error message for error turns)
    pub text: String,
    /// Attached or returned image
    pub image: Option<ImagePayload>,
    /// Whether this turn renders as an error banner
    pub is_error: bool,
    /// Classified kind for backend failures
    pub error_kind: Option<ErrorKind>,
    /// When the turn was created (Unix timestamp)
    pub created_at: i64,
}

impl ConversationTurn {
    fn build(
        role: TurnRole,
        text: String,
        image: Option<ImagePayload>,
        error_kind: Option<ErrorKind>,
        is_error: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            image,
            is_error,
            error_kind,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Turn for a user submission
    pub fn user(text: String, image: Option<ImagePayload>) -> Self {
        Self::build(TurnRole::User, text, image, None, false)
    }

    /// Successful assistant turn
    pub fn assistant(text: String, image: Option<ImagePayload>) -> Self {
        Self::build(TurnRole::Assistant, text, image, None, false)
    }

    /// Assistant error turn for a failed intent
    pub fn error(err: &OrchestratorError) -> Self {
        Self::build(TurnRole::Assistant, err.to_string(), None, err.kind(), true)
    }
}

/// One user submission: input text, optional attachment, optional mode
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    /// Input text
    #[serde(default)]
    pub text: String,
    /// Attached image
    #[serde(default)]
    pub image: Option<ImagePayload>,
    /// Explicit intent kind; inferred when absent
    #[serde(default)]
    pub mode: Option<IntentKind>,
}

/// Validate prompt text
///
/// # Returns
/// * `Ok(())` - Prompt is valid
/// * `Err(AppError)` - Prompt is empty or too long
pub fn validate_prompt(text: &str) -> Result<(), AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(
            "Prompt cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PROMPT_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Prompt exceeds maximum length of {} characters",
            MAX_PROMPT_LENGTH
        )));
    }
    Ok(())
}

/// Validate an image attachment
pub fn validate_image(image: &ImagePayload) -> Result<(), AppError> {
    if !image.is_image() {
        return Err(AppError::InvalidRequest(format!(
            "Unsupported media type: {}",
            image.media_type
        )));
    }
    if image.data.is_empty() {
        return Err(AppError::InvalidRequest("Image is empty".to_string()));
    }
    if image.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "Image is {} bytes, limit is {} bytes",
            image.data.len(),
            MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}

impl Submission {
    /// Resolve the submission into an intent
    ///
    /// An explicit mode wins. Without one, an attached image means analysis
    /// and plain text means chat. Analysis and edit fall back to
    /// `active_image` when nothing is attached.
    pub fn resolve(&self, active_image: Option<&ImagePayload>) -> Result<Intent, AppError> {
        if let Some(image) = &self.image {
            validate_image(image)?;
        }

        let mode = self.mode.unwrap_or(if self.image.is_some() {
            IntentKind::Analyze
        } else {
            IntentKind::Chat
        });

        let image_for = |kind: IntentKind| {
            self.image
                .clone()
                .or_else(|| active_image.cloned())
                .ok_or_else(|| {
                    AppError::InvalidRequest(format!(
                        "No image available to {}; attach one first",
                        kind.as_str()
                    ))
                })
        };

        match mode {
            IntentKind::Chat => {
                validate_prompt(&self.text)?;
                Ok(Intent::Chat {
                    text: self.text.clone(),
                })
            }
            IntentKind::Analyze => {
                if !self.text.trim().is_empty() {
                    validate_prompt(&self.text)?;
                }
                Ok(Intent::AnalyzeImage {
                    image: image_for(IntentKind::Analyze)?,
                    text: self.text.clone(),
                })
            }
            IntentKind::Edit => {
                validate_prompt(&self.text)?;
                Ok(Intent::EditImage {
                    image: image_for(IntentKind::Edit)?,
                    text: self.text.clone(),
                })
            }
            IntentKind::Generate => {
                validate_prompt(&self.text)?;
                Ok(Intent::GenerateImage {
                    text: self.text.clone(),
                })
            }
        }
    }
}
