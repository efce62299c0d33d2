//! Turns an uploaded data URI into a plant identification.
//!
//! One call to the vision provider per request. A reply that does not decode
//! into the five-field record is not an error: it becomes the fallback record
//! with the raw reply as its description.

use crate::models::{ImageError, InlineImage, PlantIdentification};
use crate::services::metrics;
use crate::services::providers::{GenerationParams, ProviderError, VisionProvider};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Instruction sent with every image.
pub const IDENTIFY_PROMPT: &str = "Identify this plant and provide the following information in JSON format: 1. commonName 2. scientificName 3. description 4. careInstructions 5. idealConditions";

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("No result from API")]
    NoResult,

    #[error("{provider} API error: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },
}

/// How a model reply was turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Parsed,
    Fallback,
}

impl ReplyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyOutcome::Parsed => "parsed",
            ReplyOutcome::Fallback => "fallback",
        }
    }
}

pub struct PlantIdentifier {
    provider: Arc<dyn VisionProvider>,
    params: GenerationParams,
}

impl PlantIdentifier {
    pub fn new(provider: Arc<dyn VisionProvider>, json_mode: bool) -> Self {
        let params = GenerationParams {
            response_mime_type: json_mode.then(|| "application/json".to_string()),
        };

        Self { provider, params }
    }

    pub fn provider(&self) -> &dyn VisionProvider {
        self.provider.as_ref()
    }

    /// Identify the plant in `data_uri`.
    pub async fn identify(&self, data_uri: &str) -> Result<PlantIdentification, IdentifyError> {
        let image = InlineImage::from_data_uri(data_uri).inspect_err(|_| {
            metrics::record_identification("failed");
        })?;

        let provider = self.provider.name();
        let model = self.provider.model().to_string();

        let start = Instant::now();
        let result = self
            .provider
            .describe(IDENTIFY_PROMPT, &image, &self.params)
            .await;
        metrics::record_provider_latency(provider, &model, start.elapsed().as_secs_f64());

        let response = result.map_err(|source| {
            tracing::error!(provider, model = %model, error = %source, "Vision provider call failed");
            metrics::record_provider_error(provider, source.kind());
            metrics::record_identification("failed");
            IdentifyError::Provider { provider, source }
        })?;

        let Some(text) = response.text else {
            tracing::warn!(provider, model = %model, "Vision provider returned no text");
            metrics::record_identification("no_result");
            return Err(IdentifyError::NoResult);
        };

        let (record, outcome) = parse_reply(&text);

        tracing::info!(
            provider,
            model = %model,
            image_bytes = image.byte_len,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            outcome = outcome.as_str(),
            "Plant identification completed"
        );
        metrics::record_identification(outcome.as_str());

        Ok(record)
    }
}

/// Decode a model reply into a record, or fall back to wrapping the raw text.
pub fn parse_reply(text: &str) -> (PlantIdentification, ReplyOutcome) {
    match serde_json::from_str::<PlantIdentification>(strip_code_fence(text)) {
        Ok(record) => (record, ReplyOutcome::Parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Model reply is not a plant record, using fallback");
            (PlantIdentification::fallback(text), ReplyOutcome::Fallback)
        }
    }
}

/// Models often wrap JSON in a markdown fence (```json ... ```).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[newline + 1..];
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
