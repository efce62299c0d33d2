//! Vision provider abstractions and implementations.
//!
//! The identifier talks to a [`VisionProvider`] so the Gemini backend can be
//! swapped for the scripted mock in tests and local runs.

pub mod gemini;
pub mod mock;

use crate::models::InlineImage;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// First text part of the reply, if the model produced one.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,
}

/// Generation parameters for a vision request.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// MIME type the reply should use, e.g. `application/json`.
    pub response_mime_type: Option<String>,
}

/// Trait for multimodal providers that answer a prompt about one image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name used in error messages and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier used in metrics.
    fn model(&self) -> &str;

    /// Send the prompt and image in a single request.
    async fn describe(
        &self,
        prompt: &str,
        image: &InlineImage,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
