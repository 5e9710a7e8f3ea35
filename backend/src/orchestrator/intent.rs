//! Intents and request shapes
//!
//! An intent is built once per user submission and consumed exactly once by
//! the orchestrator. Each intent kind has its own request shape.

use crate::orchestrator::constants::{DEFAULT_ANALYSIS_INSTRUCTION, IMAGE_RESPONSE_MODALITIES};
use crate::orchestrator::gemini_types::{
    GeminiApiRequest, GenerationConfig, InlineData, RequestContent, RequestPart,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Binary image payload with its declared media type
///
/// Bytes are kept decoded in memory and base64-encoded only at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Raw image bytes (base64 on the wire)
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Declared media type (e.g. "image/png")
    pub media_type: String,
}

impl ImagePayload {
    /// Create a payload from raw bytes
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Decode a base64 (or `data:` URL) payload
    pub fn from_base64(encoded: &str, media_type: impl Into<String>) -> Result<Self, base64::DecodeError> {
        Ok(Self::new(base64_bytes::decode(encoded)?, media_type))
    }

    /// Decode a Gemini inline data part
    pub fn from_inline_data(inline: &InlineData) -> Result<Self, base64::DecodeError> {
        Self::from_base64(&inline.data, inline.mime_type.clone())
    }

    /// Encode as a Gemini inline data part
    pub fn to_inline_data(&self) -> InlineData {
        InlineData {
            mime_type: self.media_type.clone(),
            data: STANDARD.encode(&self.data),
        }
    }

    /// Whether the declared media type is an image type
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

mod base64_bytes {
    use super::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
        // Browsers hand over `data:image/png;base64,....` URLs.
        let raw = match encoded.split_once("base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded,
        };
        STANDARD.decode(raw.trim())
    }

    pub(super) fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Kind of intent, used for routing and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    /// Plain chat
    Chat,
    /// Image analysis
    Analyze,
    /// Image edit
    Edit,
    /// Image generation
    Generate,
}

impl IntentKind {
    /// Label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Chat => "chat",
            IntentKind::Analyze => "analyze",
            IntentKind::Edit => "edit",
            IntentKind::Generate => "generate",
        }
    }
}

impl FromStr for IntentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(IntentKind::Chat),
            "analyze" => Ok(IntentKind::Analyze),
            "edit" => Ok(IntentKind::Edit),
            "generate" => Ok(IntentKind::Generate),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }
}

/// A user intent for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Plain chat message
    Chat {
        /// Message text
        text: String,
    },
    /// Describe or answer questions about an image
    AnalyzeImage {
        /// Image to analyze
        image: ImagePayload,
        /// Instruction (blank uses the default instruction)
        text: String,
    },
    /// Edit an image according to an instruction
    EditImage {
        /// Image to edit
        image: ImagePayload,
        /// Edit instruction
        text: String,
    },
    /// Generate a new image from a prompt
    GenerateImage {
        /// Image prompt
        text: String,
    },
}

impl Intent {
    /// Kind of this intent
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Chat { .. } => IntentKind::Chat,
            Intent::AnalyzeImage { .. } => IntentKind::Analyze,
            Intent::EditImage { .. } => IntentKind::Edit,
            Intent::GenerateImage { .. } => IntentKind::Generate,
        }
    }
}

/// Text and optional image returned by image edit/generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResult {
    /// Concatenated text parts
    pub text: String,
    /// Last inline image part, if any
    pub image: Option<ImagePayload>,
}

/// Successful result of an intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Chat or analysis text
    Text(String),
    /// Edit or generation result
    Image(ImageResult),
}

fn single_content(parts: Vec<RequestPart>, generation_config: Option<GenerationConfig>) -> GeminiApiRequest {
    GeminiApiRequest {
        contents: vec![RequestContent { parts }],
        generation_config,
    }
}

fn image_output_config() -> Option<GenerationConfig> {
    Some(GenerationConfig {
        response_modalities: Some(
            IMAGE_RESPONSE_MODALITIES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        ),
    })
}

/// Request shape for plain chat
pub fn chat_request(text: &str) -> GeminiApiRequest {
    single_content(
        vec![RequestPart::Text {
            text: text.to_string(),
        }],
        None,
    )
}

/// Request shape for image analysis: inline image plus instruction
pub fn analysis_request(image: &ImagePayload, text: &str) -> GeminiApiRequest {
    let instruction = if text.trim().is_empty() {
        DEFAULT_ANALYSIS_INSTRUCTION
    } else {
        text
    };
    single_content(
        vec![
            RequestPart::InlineData {
                inline_data: image.to_inline_data(),
            },
            RequestPart::Text {
                text: instruction.to_string(),
            },
        ],
        None,
    )
}

/// Request shape for image edit: inline image plus instruction, image output
pub fn edit_request(image: &ImagePayload, text: &str) -> GeminiApiRequest {
    single_content(
        vec![
            RequestPart::InlineData {
                inline_data: image.to_inline_data(),
            },
            RequestPart::Text {
                text: text.to_string(),
            },
        ],
        image_output_config(),
    )
}

/// Request shape for image generation: prompt only, image output
pub fn generation_request(text: &str) -> GeminiApiRequest {
    single_content(
        vec![RequestPart::Text {
            text: text.to_string(),
        }],
        image_output_config(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> ImagePayload {
        ImagePayload::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
    }

    #[test]
    fn test_analysis_request_uses_default_instruction() {
        let request = analysis_request(&png(), "   ");
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[1],
            RequestPart::Text {
                text: DEFAULT_ANALYSIS_INSTRUCTION.to_string()
            }
        );
        assert!(request.generation_config.is_none());
    }

    #[test]
    fn test_edit_and_generation_request_image_output() {
        let edit = edit_request(&png(), "make it blue");
        let modalities = edit
            .generation_config
            .and_then(|c| c.response_modalities)
            .unwrap();
        assert_eq!(modalities, vec!["TEXT".to_string(), "IMAGE".to_string()]);

        let generation = generation_request("a red fox");
        assert_eq!(generation.contents[0].parts.len(), 1);
        assert!(generation.generation_config.is_some());
    }

    #[test]
    fn test_payload_base64_round_trip_through_inline_data() {
        let image = png();
        let inline = image.to_inline_data();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(ImagePayload::from_inline_data(&inline).unwrap(), image);
    }

    #[test]
    fn test_payload_accepts_data_url() {
        let image = ImagePayload::from_base64("data:image/png;base64,aGVsbG8=", "image/png").unwrap();
        assert_eq!(image.data, b"hello".to_vec());
        assert!(image.is_image());
    }

    #[test]
    fn test_payload_json_uses_base64() {
        let json = serde_json::to_value(ImagePayload::new(b"hello".to_vec(), "image/gif")).unwrap();
        assert_eq!(json["data"], "aGVsbG8=");
        assert_eq!(json["media_type"], "image/gif");

        let back: ImagePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.data, b"hello".to_vec());
    }

    #[test]
    fn test_intent_kind() {
        let intent = Intent::GenerateImage {
            text: "a red fox".to_string(),
        };
        assert_eq!(intent.kind(), IntentKind::Generate);
        assert_eq!(intent.kind().as_str(), "generate");
        assert_eq!("EDIT".parse::<IntentKind>(), Ok(IntentKind::Edit));
        assert!("paint".parse::<IntentKind>().is_err());
    }
}
