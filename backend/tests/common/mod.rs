//! Shared test helpers: a scripted in-memory backend
#![allow(dead_code)]

use async_trait::async_trait;
use gemini_chat_backend::orchestrator::gemini_types::{
    Candidate, Content, GeminiApiRequest, GeminiApiResponse, InlineData, Part,
};
use gemini_chat_backend::orchestrator::{BackendFailure, GenerativeBackend};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// A recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: GeminiApiRequest,
    pub at: Instant,
}

/// Backend answering from a fixed script, recording every call
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<GeminiApiResponse, BackendFailure>>>,
    latencies: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<GeminiApiResponse, BackendFailure>>) -> Arc<Self> {
        Self::with_latencies(script, Vec::new())
    }

    /// Like `new`, but call `n` takes `latencies[n]` before answering
    /// (calls beyond the list answer immediately)
    pub fn with_latencies(
        script: Vec<Result<GeminiApiResponse, BackendFailure>>,
        latencies: Vec<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            latencies: Mutex::new(latencies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    /// Milliseconds between consecutive calls
    pub fn gaps_ms(&self) -> Vec<u128> {
        self.calls()
            .windows(2)
            .map(|pair| (pair[1].at - pair[0].at).as_millis())
            .collect()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GeminiApiRequest,
    ) -> Result<GeminiApiResponse, BackendFailure> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            request: request.clone(),
            at: Instant::now(),
        });
        let latency = self.latencies.lock().unwrap().pop_front();
        if let Some(latency) = latency.filter(|l| !l.is_zero()) {
            tokio::time::sleep(latency).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendFailure::new("script exhausted", None)))
    }
}

fn response_with_parts(parts: Vec<Part>) -> GeminiApiResponse {
    GeminiApiResponse {
        candidates: vec![Candidate {
            content: Content {
                parts,
                role: Some("model".to_string()),
            },
            finish_reason: Some("STOP".to_string()),
        }],
        prompt_feedback: None,
    }
}

pub fn text_response(text: &str) -> Result<GeminiApiResponse, BackendFailure> {
    Ok(response_with_parts(vec![Part {
        text: Some(text.to_string()),
        inline_data: None,
    }]))
}

/// Response with a text part and a PNG part whose bytes are `b"png-bytes"`
pub fn image_response(text: &str) -> Result<GeminiApiResponse, BackendFailure> {
    Ok(response_with_parts(vec![
        Part {
            text: Some(text.to_string()),
            inline_data: None,
        },
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/png".to_string(),
                // base64 of "png-bytes"
                data: "cG5nLWJ5dGVz".to_string(),
            }),
        },
    ]))
}

pub fn no_candidates() -> Result<GeminiApiResponse, BackendFailure> {
    Ok(GeminiApiResponse::default())
}

pub fn rate_limited() -> Result<GeminiApiResponse, BackendFailure> {
    Err(BackendFailure::new(
        "Resource has been exhausted (e.g. check quota). [RESOURCE_EXHAUSTED]",
        Some(429),
    ))
}

pub fn failure(message: &str, status: Option<u16>) -> Result<GeminiApiResponse, BackendFailure> {
    Err(BackendFailure::new(message, status))
}
