//! Intent API handlers
//!
//! One endpoint per orchestrator operation. These bypass the session: they
//! neither append turns nor touch the active image.

use crate::api::utils::RouterState;
use crate::error::AppError;
use crate::orchestrator::{ImagePayload, ImageResult, OrchestratorConfig};
use crate::session::models::{validate_image, validate_prompt};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
}

/// Request carrying an image and an instruction
#[derive(Debug, Deserialize)]
pub struct ImageIntentRequest {
    /// Image to analyze or edit
    pub image: ImagePayload,
    /// Instruction; optional for analysis
    #[serde(default)]
    pub text: String,
}

/// Image generation request
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    /// Image prompt
    pub text: String,
}

/// Text-only result
#[derive(Debug, Serialize)]
pub struct TextResponse {
    /// Model text
    pub text: String,
}

/// POST /api/chat - Plain chat with model fallback
pub async fn chat(
    State(state): State<RouterState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, AppError> {
    let orchestrator = state.orchestrator()?;
    let Json(request) = payload?;
    validate_prompt(&request.message)?;

    let text = orchestrator.chat(&request.message).await?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/images/analyze - Describe an image
pub async fn analyze_image(
    State(state): State<RouterState>,
    payload: Result<Json<ImageIntentRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, AppError> {
    let orchestrator = state.orchestrator()?;
    let Json(request) = payload?;
    validate_image(&request.image)?;
    if !request.text.trim().is_empty() {
        validate_prompt(&request.text)?;
    }

    let text = orchestrator
        .analyze_image(&request.image, &request.text)
        .await?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/images/edit - Edit an image according to an instruction
pub async fn edit_image(
    State(state): State<RouterState>,
    payload: Result<Json<ImageIntentRequest>, JsonRejection>,
) -> Result<Json<ImageResult>, AppError> {
    let orchestrator = state.orchestrator()?;
    let Json(request) = payload?;
    validate_image(&request.image)?;
    validate_prompt(&request.text)?;

    let result = orchestrator.edit_image(&request.image, &request.text).await?;
    Ok(Json(result))
}

/// POST /api/images/generate - Generate an image from a prompt
pub async fn generate_image(
    State(state): State<RouterState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<ImageResult>, AppError> {
    let orchestrator = state.orchestrator()?;
    let Json(request) = payload?;
    validate_prompt(&request.text)?;

    let result = orchestrator.generate_image(&request.text).await?;
    Ok(Json(result))
}

/// GET /api/config - Effective orchestrator configuration
pub async fn get_config(State(state): State<RouterState>) -> Json<OrchestratorConfig> {
    Json(state.orchestrator_config().clone())
}
