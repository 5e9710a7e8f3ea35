//! Gemini API request and response types
//!
//! Structs that mirror the Gemini `generateContent` JSON format.
//! Used to serialize requests and deserialize responses into typed Rust structs.
//! The REST API speaks camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Top-level Gemini API response
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GeminiApiResponse {
    /// Concatenated text of the first candidate's text parts
    ///
    /// Returns `None` when there is no candidate or no text part carries
    /// any content.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// A single candidate response from the model
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of this candidate
    #[serde(default)]
    pub content: Content,
    /// Why the model stopped generating (if applicable)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Content {
    /// List of content parts (text or inline binary data)
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Role of the content (e.g., "model")
    #[serde(default)]
    pub role: Option<String>,
}

/// A single part of response content
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content of this part
    #[serde(default)]
    pub text: Option<String>,
    /// Inline binary payload of this part
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Base64-encoded binary payload with its MIME type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload (e.g., "image/png")
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Request structure for Gemini API
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiRequest {
    /// List of content items to send
    pub contents: Vec<RequestContent>,
    /// Optional generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content structure for requests
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RequestContent {
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

/// A single part for requests
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequestPart {
    /// Plain text part
    Text {
        /// The text content
        text: String,
    },
    /// Inline image part
    InlineData {
        /// The image payload
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Generation configuration for requests
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output modalities (e.g., `["TEXT", "IMAGE"]` for image generation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_mixed_parts() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                    ],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;

        let parsed: GeminiApiResponse = serde_json::from_str(body).unwrap();
        let parts = &parsed.candidates[0].content.parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("Here you go"));
        assert_eq!(
            parts[1].inline_data.as_ref().map(|d| d.mime_type.as_str()),
            Some("image/png")
        );
        assert_eq!(parsed.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_response_without_candidates_defaults_to_empty() {
        let parsed: GeminiApiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(parsed.candidates.is_empty());
        assert_eq!(
            parsed.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn test_text_concatenates_first_candidate() {
        let parsed: GeminiApiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text().as_deref(), Some("ab"));

        let empty: GeminiApiResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#)
                .unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_request_serializes_camel_case_parts() {
        let request = GeminiApiRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: "describe".to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(value["contents"][0]["parts"][1]["text"], "describe");
        assert_eq!(
            value["generationConfig"]["responseModalities"][1],
            "IMAGE"
        );
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }
}
