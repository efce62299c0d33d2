//! Mock provider implementation for testing and local runs.

use super::{GenerationParams, ProviderError, ProviderResponse, VisionProvider};
use crate::models::InlineImage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reply used when the service runs with `GENAI_PROVIDER=mock`.
pub const SAMPLE_REPLY: &str = r#"{
  "commonName": "Boston Fern",
  "scientificName": "Nephrolepis exaltata",
  "description": "A lush evergreen fern with long, arching fronds of small leaflets.",
  "careInstructions": "Keep the soil evenly moist and mist the fronds regularly.",
  "idealConditions": "Bright indirect light, high humidity, 16-24°C."
}"#;

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Empty,
    Fail(String),
}

/// Mock vision provider with a scripted reply.
pub struct MockVisionProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// Answer every request with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Text(text.into()))
    }

    /// Answer every request with a reply that has no text part.
    pub fn empty() -> Self {
        Self::with_reply(MockReply::Empty)
    }

    /// Fail every request as an upstream API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Fail(message.into()))
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `describe` calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockVisionProvider {
    fn default() -> Self {
        Self::replying(SAMPLE_REPLY)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn describe(
        &self,
        prompt: &str,
        _image: &InlineImage,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let text = match &self.reply {
            MockReply::Text(text) => Some(text.clone()),
            MockReply::Empty => None,
            MockReply::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map(|t| t.len() as i32 / 4).unwrap_or(0),
            text,
            input_tokens: prompt.len() as i32 / 4,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
