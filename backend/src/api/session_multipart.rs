//! Session submit endpoint with multipart support
//!
//! Accepts an image upload alongside the text, so browsers can post a file
//! input directly without base64 glue.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use std::path::Path;
use tracing::{error, info, warn};

use crate::api::utils::{submit_and_stream, RouterState};
use crate::error::AppError;
use crate::orchestrator::{ImagePayload, IntentKind};
use crate::session::models::MAX_IMAGE_BYTES;
use crate::session::Submission;

/// Media type guessed from a filename extension
fn media_type_from_filename(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

fn bad_field(name: &str, e: impl std::fmt::Display) -> AppError {
    error!("Failed to read {} field: {}", name, e);
    AppError::InvalidRequest(format!("Failed to read {} field", name))
}

/// POST /api/session/submit/multipart - Submit with an uploaded image
///
/// Accepts multipart form data with:
/// - text (or message): input text
/// - mode: optional `chat | analyze | edit | generate`
/// - image: optional image file
pub async fn submit_multipart(
    State(state): State<RouterState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_field("multipart", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "text" | "message" => {
                submission.text = field.text().await.map_err(|e| bad_field("text", e))?;
            }
            "mode" => {
                let text = field.text().await.map_err(|e| bad_field("mode", e))?;
                if !text.trim().is_empty() {
                    let mode = text.parse::<IntentKind>().map_err(AppError::InvalidRequest)?;
                    submission.mode = Some(mode);
                }
            }
            "image" => {
                // Get filename and content type first (before moving field)
                let declared = field.content_type().map(|s| s.to_string());
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| bad_field("image", e))?;

                if data.is_empty() {
                    continue;
                }
                if data.len() > MAX_IMAGE_BYTES {
                    error!("Image file too large: {} bytes", data.len());
                    return Err(AppError::PayloadTooLarge(format!(
                        "Image is {} bytes, limit is {} bytes",
                        data.len(),
                        MAX_IMAGE_BYTES
                    )));
                }

                let media_type = declared
                    .filter(|ct| ct.starts_with("image/"))
                    .or_else(|| {
                        filename
                            .as_deref()
                            .and_then(media_type_from_filename)
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                info!(
                    "Received uploaded image: {:?} ({} bytes, {})",
                    filename,
                    data.len(),
                    media_type
                );
                submission.image = Some(ImagePayload::new(data.to_vec(), media_type));
            }
            _ => {
                warn!("Unknown multipart field: {}", field_name);
            }
        }
    }

    submit_and_stream(&state, submission).await
}
