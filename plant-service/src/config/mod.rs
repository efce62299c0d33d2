use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Largest photo the upload page accepts (5 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Request body ceiling for `/api/identify`. A 5 MiB photo grows by a third
/// once base64 encoded, plus the data URI prefix and JSON wrapping.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct PlantConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub upload: UploadConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Credential for the Gemini API. Absence is not a startup failure: the
    /// identify endpoint reports it on every request instead.
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    /// Multimodal model used for identification (e.g., gemini-2.0-flash)
    pub vision_model: String,
    pub api_base: String,
    /// Ask the model for `application/json` output.
    pub json_mode: bool,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_image_bytes: usize,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

/// Which vision backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown GENAI_PROVIDER '{}' (expected 'gemini' or 'mock')",
                other
            ))),
        }
    }
}

impl PlantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the service settings from a variable lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| var_or(&lookup, key, default);

        let api_key = lookup("GOOGLE_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Secret::new);

        let max_image_bytes = parse_bytes("PLANT_MAX_IMAGE_BYTES", lookup("PLANT_MAX_IMAGE_BYTES"))?
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);
        let max_body_bytes = body_limit_for(
            max_image_bytes,
            parse_bytes("PLANT_MAX_BODY_BYTES", lookup("PLANT_MAX_BODY_BYTES"))?,
        );

        Ok(PlantConfig {
            common,
            google: GoogleConfig { api_key },
            models: ModelConfig {
                provider: get("GENAI_PROVIDER", "gemini").parse()?,
                vision_model: get("GENAI_VISION_MODEL", DEFAULT_VISION_MODEL),
                api_base: get("GENAI_API_BASE", DEFAULT_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                json_mode: parse_bool(&get("GENAI_JSON_MODE", "true")),
            },
            upload: UploadConfig {
                max_image_bytes,
                max_body_bytes,
            },
            observability: ObservabilityConfig {
                log_level: get("LOG_LEVEL", "info"),
                otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
            },
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.google.api_key.is_some()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn var_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// A byte count from the environment. Unset or blank is `None`; anything that
/// is not a plain integer is a configuration error.
fn parse_bytes(key: &str, value: Option<String>) -> Result<Option<usize>, AppError> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    value.parse().map(Some).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!(
            "{} must be a number of bytes, got '{}'",
            key,
            value
        ))
    })
}

/// Smallest request body that carries an image of `max_image_bytes` as a
/// base64 data URI inside `{"image": "..."}`.
pub fn required_body_bytes(max_image_bytes: usize) -> usize {
    const ENVELOPE_BYTES: usize = 1024;
    max_image_bytes.div_ceil(3) * 4 + ENVELOPE_BYTES
}

/// The body limit never drops below what the image limit needs, so a photo the
/// page accepts is never refused with 413.
fn body_limit_for(max_image_bytes: usize, configured: Option<usize>) -> usize {
    let required = required_body_bytes(max_image_bytes);

    match configured {
        Some(bytes) if bytes < required => {
            tracing::warn!(
                configured = bytes,
                required,
                "PLANT_MAX_BODY_BYTES is too small for PLANT_MAX_IMAGE_BYTES, raising it"
            );
            required
        }
        Some(bytes) => bytes,
        None => DEFAULT_MAX_BODY_BYTES.max(required),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<PlantConfig, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlantConfig::from_lookup(core_config::Config::default(), |key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config_from(&[]).unwrap();

        assert!(!config.has_api_key());
        assert_eq!(config.models.provider, ProviderKind::Gemini);
        assert_eq!(config.models.vision_model, DEFAULT_VISION_MODEL);
        assert_eq!(config.models.api_base, DEFAULT_API_BASE);
        assert!(config.models.json_mode);
        assert_eq!(config.upload.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(config.observability.otlp_endpoint, None);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("GOOGLE_API_KEY", "   ")]).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn api_key_is_kept_secret() {
        let config = config_from(&[("GOOGLE_API_KEY", "abc123")]).unwrap();
        let key = config.google.api_key.as_ref().unwrap();

        assert_eq!(key.expose_secret(), "abc123");
        assert!(!format!("{:?}", config).contains("abc123"));
    }

    #[test]
    fn malformed_byte_limits_are_rejected() {
        for key in ["PLANT_MAX_IMAGE_BYTES", "PLANT_MAX_BODY_BYTES"] {
            let err = config_from(&[(key, "5MB")]).unwrap_err();

            assert!(matches!(err, AppError::ConfigError(_)), "{}", key);
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn blank_byte_limit_uses_default() {
        let config = config_from(&[("PLANT_MAX_IMAGE_BYTES", " ")]).unwrap();
        assert_eq!(config.upload.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn default_body_limit_fits_default_image() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.upload.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.upload.max_body_bytes >= required_body_bytes(DEFAULT_MAX_IMAGE_BYTES));
    }

    #[test]
    fn raising_image_limit_alone_raises_body_limit() {
        let image = 10 * 1024 * 1024;
        let config = config_from(&[("PLANT_MAX_IMAGE_BYTES", "10485760")]).unwrap();

        assert_eq!(config.upload.max_image_bytes, image);
        assert_eq!(config.upload.max_body_bytes, required_body_bytes(image));
        assert!(config.upload.max_body_bytes > image / 3 * 4);
    }

    #[test]
    fn body_limit_below_image_needs_is_raised() {
        let config = config_from(&[("PLANT_MAX_BODY_BYTES", "1024")]).unwrap();
        assert_eq!(
            config.upload.max_body_bytes,
            required_body_bytes(DEFAULT_MAX_IMAGE_BYTES)
        );

        let config = config_from(&[("PLANT_MAX_BODY_BYTES", "20000000")]).unwrap();
        assert_eq!(config.upload.max_body_bytes, 20_000_000);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("GENAI_PROVIDER", "Mock"),
            ("GENAI_VISION_MODEL", "gemini-1.5-pro"),
            ("GENAI_API_BASE", "http://localhost:9000/"),
            ("GENAI_JSON_MODE", "false"),
            ("PLANT_MAX_IMAGE_BYTES", "1024"),
        ])
        .unwrap();

        assert_eq!(config.models.provider, ProviderKind::Mock);
        assert_eq!(config.models.vision_model, "gemini-1.5-pro");
        assert_eq!(config.models.api_base, "http://localhost:9000");
        assert!(!config.models.json_mode);
        assert_eq!(config.upload.max_image_bytes, 1024);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = config_from(&[("GENAI_PROVIDER", "openai")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
