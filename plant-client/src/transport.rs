//! HTTP transport to `POST /api/identify`.

use crate::models::PlantInfo;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when the service fails without saying why.
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to identify plant";

#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-success response; `message` is the server's `error` string or the default.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Server { status, .. } => Some(*status),
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Serialize)]
struct IdentifyRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the identification endpoint.
#[derive(Debug, Clone)]
pub struct IdentifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentifyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one identification request. No retries.
    pub async fn identify(&self, data_uri: &str) -> Result<PlantInfo, TransportError> {
        let url = format!("{}/api/identify", self.base_url);

        tracing::debug!(url = %url, image_len = data_uri.len(), "Sending identification request");

        let response = self
            .client
            .post(&url)
            .json(&IdentifyRequest { image: data_uri })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

            tracing::warn!(status = status.as_u16(), error = %message, "Identification failed");

            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<PlantInfo>().await?)
    }
}
