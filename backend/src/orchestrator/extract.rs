//! Response extractors
//!
//! Turn a successful backend response into the intent's result payload.
//! Extraction failures are classified but never retried.

use crate::orchestrator::classify::{ClassifiedError, ErrorKind};
use crate::orchestrator::gemini_types::GeminiApiResponse;
use crate::orchestrator::intent::{ImagePayload, ImageResult};
use serde_json::json;

/// Text of the response, or `EMPTY_RESPONSE`
pub fn extract_text(model: &str, response: GeminiApiResponse) -> Result<String, ClassifiedError> {
    response
        .text()
        .ok_or_else(|| ClassifiedError::empty_response(model))
}

/// Text and image parts of the first candidate
///
/// Zero candidates is `NO_CANDIDATES`. Text parts are concatenated in order;
/// when several inline images are present the last one wins. A candidate
/// with neither text nor image is `EMPTY_RESPONSE`.
pub fn extract_image_result(
    model: &str,
    response: GeminiApiResponse,
) -> Result<ImageResult, ClassifiedError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ClassifiedError::no_candidates(model))?;

    let mut text = String::new();
    let mut image = None;
    for part in candidate.content.parts {
        if let Some(inline) = part.inline_data {
            let decoded = ImagePayload::from_inline_data(&inline).map_err(|e| ClassifiedError {
                message: "The model returned an image that could not be decoded.".to_string(),
                kind: ErrorKind::UnknownError,
                raw_details: json!({ "model": model, "decode_error": e.to_string() }),
            })?;
            image = Some(decoded);
        } else if let Some(fragment) = part.text {
            text.push_str(&fragment);
        }
    }

    if text.is_empty() && image.is_none() {
        return Err(ClassifiedError::empty_response(model));
    }

    Ok(ImageResult { text, image })
}
