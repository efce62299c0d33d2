#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use plant_service::config::PlantConfig;
use plant_service::services::providers::mock::MockVisionProvider;
use plant_service::services::PlantIdentifier;
use plant_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";

/// A tiny JPEG header, enough to look like a real upload.
pub const JPEG_DATA_URI: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHRofHh0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/2Q==";

pub const FERN_REPLY: &str = r#"{"commonName":"Boston Fern","scientificName":"Nephrolepis exaltata","description":"Arching fronds.","careInstructions":"Keep moist.","idealConditions":"Indirect light."}"#;

/// Config with random port, mock provider and the given variables.
pub fn test_config(vars: &[(&str, &str)]) -> PlantConfig {
    let mut map: HashMap<String, String> = HashMap::new();
    map.insert("GENAI_PROVIDER".to_string(), "mock".to_string());
    for (k, v) in vars {
        map.insert(k.to_string(), v.to_string());
    }

    PlantConfig::from_lookup(CoreConfig { port: 0 }, |key| map.get(key).cloned())
        .expect("Failed to build test config")
}

/// Router with a credential configured and `provider` behind the identifier.
pub fn router_with(provider: MockVisionProvider) -> (Router, Arc<MockVisionProvider>) {
    let provider = Arc::new(provider);
    let identifier = Arc::new(PlantIdentifier::new(provider.clone(), true));
    let state = AppState::new(
        test_config(&[("GOOGLE_API_KEY", TEST_API_KEY)]),
        Some(identifier),
    );
    (build_router(state), provider)
}

/// Router with no credential configured, as in a deployment missing the key.
pub fn router_without_key() -> (Router, Arc<MockVisionProvider>) {
    let provider = Arc::new(MockVisionProvider::replying(FERN_REPLY));
    let identifier = Arc::new(PlantIdentifier::new(provider.clone(), true));
    let state = AppState::new(test_config(&[]), Some(identifier));
    (build_router(state), provider)
}

pub async fn post_identify(router: Router, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/identify")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub fn image_body(image: &str) -> String {
    serde_json::json!({ "image": image }).to_string()
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the real application (mock provider) on a random port.
    pub async fn spawn(vars: &[(&str, &str)]) -> Self {
        let app = Application::build(test_config(vars))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
