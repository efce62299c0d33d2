//! Gemini provider against a stubbed REST API.

use plant_service::models::InlineImage;
use plant_service::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use plant_service::services::providers::{GenerationParams, ProviderError, VisionProvider};
use plant_service::services::{IdentifyError, PlantIdentifier};
use secrecy::Secret;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.0-flash";
const MODEL_PATH: &str = "/models/gemini-2.0-flash:generateContent";
const DATA_URI: &str = "data:image/png;base64,aGVsbG8=";

fn provider(server: &MockServer) -> GeminiVisionProvider {
    GeminiVisionProvider::new(GeminiConfig {
        api_key: Secret::new("secret-key".to_string()),
        model: MODEL.to_string(),
        api_base: server.uri(),
    })
    .expect("Failed to build provider")
}

fn reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 300,
            "candidatesTokenCount": 80,
            "totalTokenCount": 380
        }
    })
}

#[tokio::test]
async fn sends_prompt_and_inline_image_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "secret-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": "Describe" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("a fern")))
        .expect(1)
        .mount(&server)
        .await;

    let image = InlineImage::from_data_uri(DATA_URI).unwrap();
    let response = provider(&server)
        .describe("Describe", &image, &GenerationParams::default())
        .await
        .expect("describe failed");

    assert_eq!(response.text.as_deref(), Some("a fern"));
    assert_eq!(response.input_tokens, 300);
    assert_eq!(response.output_tokens, 80);
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let image = InlineImage::from_data_uri(DATA_URI).unwrap();
    let err = provider(&server)
        .describe("Describe", &image, &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn api_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let image = InlineImage::from_data_uri(DATA_URI).unwrap();
    let err = provider(&server)
        .describe("Describe", &image, &GenerationParams::default())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("400"), "{}", message);
    assert!(message.contains("API key not valid"), "{}", message);
}

#[tokio::test]
async fn safety_block_is_content_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let image = InlineImage::from_data_uri(DATA_URI).unwrap();
    let err = provider(&server)
        .describe("Describe", &image, &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ContentFiltered));
}

#[tokio::test]
async fn truncated_reply_still_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"commonName\": \"Fer" }] },
                "finishReason": "MAX_TOKENS"
            }]
        })))
        .mount(&server)
        .await;

    let image = InlineImage::from_data_uri(DATA_URI).unwrap();
    let response = provider(&server)
        .describe("Describe", &image, &GenerationParams::default())
        .await
        .expect("describe failed");

    assert_eq!(response.text.as_deref(), Some("{\"commonName\": \"Fer"));
    assert_eq!(response.input_tokens, 0);
}

#[tokio::test]
async fn no_candidates_means_no_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let identifier = PlantIdentifier::new(Arc::new(provider(&server)), true);
    let err = identifier.identify(DATA_URI).await.unwrap_err();

    assert!(matches!(err, IdentifyError::NoResult));
}

#[tokio::test]
async fn identifier_parses_json_reply_from_gemini() {
    let server = MockServer::start().await;
    let record = serde_json::json!({
        "commonName": "Monstera",
        "scientificName": "Monstera deliciosa",
        "description": "Split leaves.",
        "careInstructions": "Water weekly.",
        "idealConditions": "Warm and humid."
    });
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(&record.to_string())))
        .mount(&server)
        .await;

    let identifier = PlantIdentifier::new(Arc::new(provider(&server)), true);
    let result = identifier.identify(DATA_URI).await.expect("identify failed");

    assert_eq!(serde_json::to_value(&result).unwrap(), record);
}

#[tokio::test]
async fn upstream_failure_is_wrapped_as_gemini_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let identifier = PlantIdentifier::new(Arc::new(provider(&server)), true);
    let err = identifier.identify(DATA_URI).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Gemini API error: "), "{}", message);
    assert!(message.contains("overloaded"), "{}", message);
}

#[tokio::test]
async fn health_check_fetches_model_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/models/{}", MODEL)))
        .and(query_param("key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("models/{}", MODEL)
        })))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server)
        .health_check()
        .await
        .expect("health check failed");
}
