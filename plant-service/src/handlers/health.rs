use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "plant-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check: a provider is configured and answers its health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(identifier) = state.identifier.as_ref() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    match identifier.provider().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(
                provider = identifier.provider().name(),
                error = %e,
                "Readiness check failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
