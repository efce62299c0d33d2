//! End-to-end identification workflow tests library.
//!
//! Starts the plant service in-process with the mock vision provider, or
//! targets an already running instance when `PLANT_SERVICE_URL` is set, and
//! drives it through `plant-client` the way a user would.
//!
//! ## Usage
//!
//! ```bash
//! # In-process service, no external dependencies
//! cargo test -p workflow-tests
//!
//! # Against a running deployment
//! PLANT_SERVICE_URL=http://localhost:8080 cargo test -p workflow-tests
//! ```

use anyhow::{anyhow, Result};
use plant_client::{IdentifyClient, IdentifySession};
use plant_service::config::PlantConfig;
use plant_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::Once;
use std::time::Duration;

pub use plant_client;
pub use plant_service;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug,plant_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Credential handed to the in-process service. The mock provider never uses it.
pub const TEST_API_KEY: &str = "workflow-test-key";

/// Configuration for an in-process service on a random port with the mock provider.
pub fn mock_service_config(extra: &[(&str, &str)]) -> Result<PlantConfig> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("GENAI_PROVIDER".to_string(), "mock".to_string());
    vars.insert("GOOGLE_API_KEY".to_string(), TEST_API_KEY.to_string());
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Ok(PlantConfig::from_lookup(CoreConfig { port: 0 }, |key| {
        vars.get(key).cloned()
    })?)
}

/// Start the service in the background and return its base URL.
pub async fn spawn_service(config: PlantConfig) -> Result<String> {
    let app = Application::build(config).await?;
    let base_url = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        if let Err(e) = app.run_until_stopped().await {
            tracing::error!(error = %e, "Plant service stopped");
        }
    });

    Ok(base_url)
}

/// Poll `/health` until the service answers 200 OK.
pub async fn wait_for_service(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/health", base_url);
    let start = std::time::Instant::now();

    loop {
        let last = match client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(url = %url, "Plant service is healthy");
                return Ok(());
            }
            Ok(resp) => format!("status: {}", resp.status()),
            Err(e) => format!("error: {}", e),
        };

        if start.elapsed() > timeout {
            return Err(anyhow!("Timeout waiting for plant service ({})", last));
        }

        tracing::debug!(url = %url, "Waiting for plant service: {}", last);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Test context: a healthy service plus a client pointed at it.
pub struct WorkflowTestContext {
    pub base_url: String,
    pub client: IdentifyClient,
}

impl WorkflowTestContext {
    /// Use `PLANT_SERVICE_URL` when set, otherwise spawn a mock-backed service.
    pub async fn new(timeout: Duration) -> Result<Self> {
        init_tracing();

        let base_url = match std::env::var("PLANT_SERVICE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => spawn_service(mock_service_config(&[])?).await?,
        };

        wait_for_service(&base_url, timeout).await?;

        Ok(Self {
            client: IdentifyClient::new(base_url.clone()),
            base_url,
        })
    }

    pub fn session(&self) -> IdentifySession {
        IdentifySession::new(self.client.clone())
    }
}
