use std::time::Duration;

use spritegen_core::error::CoreError;
use spritegen_core::model::{ImageModel, DEFAULT_CLASSIFIER_MODEL};
use spritegen_openai::api::DEFAULT_API_URL;

/// Default per-request timeout. Image generation routinely takes over a
/// minute.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development; API keys
/// default to empty and are usually supplied by the UI shell instead.
#[derive(Debug, Clone)]
pub struct SpriteConfig {
    /// Key used for DALL-E 3 requests.
    pub dalle_api_key: String,
    /// Key used for GPT-Image-1 requests.
    pub gpt_image_api_key: String,
    /// Model family selected at startup.
    pub image_model: ImageModel,
    /// Base URL of the OpenAI-compatible API.
    pub api_base_url: String,
    /// Chat model used for message classification.
    pub classifier_model: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            dalle_api_key: String::new(),
            gpt_image_api_key: String::new(),
            image_model: ImageModel::default(),
            api_base_url: DEFAULT_API_URL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SpriteConfig {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `DALL_E_3_API_KEY`     | empty                       |
    /// | `GPT_IMAGE_1_API_KEY`  | empty                       |
    /// | `SPRITE_IMAGE_MODEL`   | `gpt-image-1`               |
    /// | `OPENAI_API_BASE`      | `https://api.openai.com/v1` |
    /// | `CLASSIFIER_MODEL`     | `gpt-4o-mini`               |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                       |
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let image_model = match lookup("SPRITE_IMAGE_MODEL") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => defaults.image_model,
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Validation(format!(
                    "REQUEST_TIMEOUT_SECS must be a valid u64 (got '{raw}')"
                ))
            })?,
            None => defaults.request_timeout_secs,
        };
        if request_timeout_secs == 0 {
            return Err(CoreError::Validation(
                "REQUEST_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            dalle_api_key: lookup("DALL_E_3_API_KEY").unwrap_or_default(),
            gpt_image_api_key: lookup("GPT_IMAGE_1_API_KEY").unwrap_or_default(),
            image_model,
            api_base_url: lookup("OPENAI_API_BASE").unwrap_or(defaults.api_base_url),
            classifier_model: lookup("CLASSIFIER_MODEL").unwrap_or(defaults.classifier_model),
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether both model-family keys are present.
    pub fn has_all_keys(&self) -> bool {
        !self.dalle_api_key.trim().is_empty() && !self.gpt_image_api_key.trim().is_empty()
    }
}
