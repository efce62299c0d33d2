//! Application startup and lifecycle management.
//!
//! The vision provider and its HTTP client are built once here and handed to
//! handlers through [`AppState`].

use crate::config::{PlantConfig, ProviderKind};
use crate::handlers;
use crate::middleware::metrics::metrics_middleware;
use crate::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use crate::services::providers::mock::MockVisionProvider;
use crate::services::providers::VisionProvider;
use crate::services::PlantIdentifier;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PlantConfig,
    /// `None` when no provider could be configured (Gemini without an API key).
    pub identifier: Option<Arc<PlantIdentifier>>,
}

impl AppState {
    pub fn new(config: PlantConfig, identifier: Option<Arc<PlantIdentifier>>) -> Self {
        Self { config, identifier }
    }

    /// Build state with the provider selected by `config`.
    pub fn from_config(config: PlantConfig) -> Result<Self, AppError> {
        let identifier = build_identifier(&config)?;
        Ok(Self::new(config, identifier))
    }
}

/// Construct the identifier for the configured provider.
pub fn build_identifier(config: &PlantConfig) -> Result<Option<Arc<PlantIdentifier>>, AppError> {
    let provider: Arc<dyn VisionProvider> = match config.models.provider {
        ProviderKind::Gemini => {
            let Some(api_key) = config.google.api_key.clone() else {
                tracing::warn!("GOOGLE_API_KEY is not set; identification requests will fail");
                return Ok(None);
            };

            let gemini = GeminiVisionProvider::new(GeminiConfig {
                api_key,
                model: config.models.vision_model.clone(),
                api_base: config.models.api_base.clone(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

            Arc::new(gemini)
        }
        ProviderKind::Mock => Arc::new(MockVisionProvider::default()),
    };

    tracing::info!(
        provider = provider.name(),
        model = %provider.model(),
        json_mode = config.models.json_mode,
        "Initialized vision provider"
    );

    Ok(Some(Arc::new(PlantIdentifier::new(
        provider,
        config.models.json_mode,
    ))))
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.upload.max_body_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/api/identify",
            post(handlers::identify_plant).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PlantConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Self::build_with_state(state).await
    }

    /// Build the application around prepared state (tests inject providers here).
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        crate::services::metrics::init_metrics();

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Plant service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run the application until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_graceful_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
