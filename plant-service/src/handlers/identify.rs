use crate::models::{declared_mime_type, PlantIdentification, DATA_URI_IMAGE_PREFIX};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use std::fmt::Display;

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// `POST /api/identify`
///
/// Checks run in order and each short-circuits: the API key must be
/// configured, the body must be JSON, `image` must be present and must be an
/// image data URI. Every failure past that point comes back as a 500 carrying
/// the underlying message.
pub async fn identify_plant(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PlantIdentification>, AppError> {
    let identifier = match &state.identifier {
        Some(identifier) if state.config.has_api_key() => identifier,
        _ => {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "API key not configured"
            )))
        }
    };

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            identification_failed(rejection.body_text())
        }
    })?;

    let request: IdentifyRequest =
        serde_json::from_slice(&body).map_err(identification_failed)?;

    let image = request
        .image
        .filter(|image| !image.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No image provided")))?;

    if !image.starts_with(DATA_URI_IMAGE_PREFIX) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid image format"
        )));
    }

    tracing::info!(
        declared_mime_type = declared_mime_type(&image).unwrap_or("-"),
        data_uri_len = image.len(),
        "Identifying plant"
    );

    let record = identifier
        .identify(&image)
        .await
        .map_err(identification_failed)?;

    Ok(Json(record))
}

fn identification_failed(cause: impl Display) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Failed to identify plant: {}", cause))
}
