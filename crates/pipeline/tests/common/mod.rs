//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use spritegen_core::api_key::ApiKey;
use spritegen_core::error::GenerationError;
use spritegen_core::image_data::{DataUrl, ReferenceImage};
use spritegen_core::model::ImageModel;
use spritegen_openai::client::GenerationClient;
use spritegen_pipeline::config::SpriteConfig;
use spritegen_pipeline::events::{GenerationEvent, GenerationObserver};
use spritegen_pipeline::key_store::MemoryKeyStore;
use spritegen_pipeline::studio::SpriteStudio;

/// Base64 payload returned by every successful scripted image call.
pub const IMAGE_B64: &str = "aW1hZ2U=";

pub const TEST_KEY: &str = "sk-test";

// ---------------------------------------------------------------------------
// Scripted client
// ---------------------------------------------------------------------------

/// Which client method a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Generate,
    Edit,
    Classify,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub model: Option<ImageModel>,
    pub prompt: String,
    pub had_image: bool,
}

struct Rule {
    needle: String,
    error: Option<GenerationError>,
    delay: Duration,
}

/// In-memory [`GenerationClient`] whose behaviour is keyed on prompt
/// substrings (style display names, `frame 3 of`, ...).
pub struct ScriptedClient {
    rules: Vec<Rule>,
    classification: Result<String, GenerationError>,
    calls: Mutex<Vec<RecordedCall>>,
    completed: Mutex<Vec<String>>,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            classification: Ok("unknown".to_string()),
            calls: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Fail every image call whose prompt contains `needle`.
    pub fn fail_when(mut self, needle: &str, error: GenerationError) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            error: Some(error),
            delay: Duration::ZERO,
        });
        self
    }

    /// Delay every image call whose prompt contains `needle`.
    pub fn delay_when(mut self, needle: &str, delay: Duration) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            error: None,
            delay,
        });
        self
    }

    pub fn classify_as(mut self, reply: &str) -> Self {
        self.classification = Ok(reply.to_string());
        self
    }

    pub fn classify_error(mut self, error: GenerationError) -> Self {
        self.classification = Err(error);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind != CallKind::Classify)
            .collect()
    }

    /// Prompts of finished image calls, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    async fn image_call(
        &self,
        kind: CallKind,
        model: ImageModel,
        prompt: &str,
        had_image: bool,
    ) -> Result<DataUrl, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            model: Some(model),
            prompt: prompt.to_string(),
            had_image,
        });

        let matching: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| prompt.contains(&r.needle))
            .collect();
        let delay = matching.iter().map(|r| r.delay).max().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(prompt.to_string());

        match matching.iter().find_map(|r| r.error.clone()) {
            Some(error) => Err(error),
            None => Ok(DataUrl::from_png_base64(IMAGE_B64)),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate_from_text(
        &self,
        model: ImageModel,
        prompt: &str,
        _api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError> {
        self.image_call(CallKind::Generate, model, prompt, false).await
    }

    async fn edit_with_reference(
        &self,
        model: ImageModel,
        prompt: &str,
        image: Option<&ReferenceImage>,
        _api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError> {
        if image.is_none() && model.requires_reference() {
            return Err(GenerationError::MissingInput("No image provided".into()));
        }
        self.image_call(CallKind::Edit, model, prompt, image.is_some())
            .await
    }

    async fn classify(&self, prompt_text: &str, _api_key: &ApiKey) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind: CallKind::Classify,
            model: None,
            prompt: prompt_text.to_string(),
            had_image: false,
        });
        self.classification.clone()
    }
}

// ---------------------------------------------------------------------------
// Recording observer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<GenerationEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<GenerationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl GenerationObserver for RecordingObserver {
    fn on_event(&self, event: &GenerationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn remote_error(status: u16) -> GenerationError {
    GenerationError::Remote {
        status,
        message: format!("upstream failed with {status}"),
    }
}

pub fn sample_reference() -> ReferenceImage {
    ReferenceImage::new(vec![0x89, b'P', b'N', b'G'], "image/png", "hero.png")
}

/// Studio over `client` with a user key already set.
pub fn test_studio(client: Arc<ScriptedClient>) -> (SpriteStudio, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let key_store = Arc::new(MemoryKeyStore::new());
    key_store_with_key(&key_store);
    let studio = SpriteStudio::new(
        SpriteConfig::default(),
        client,
        observer.clone(),
        key_store,
    )
    .unwrap();
    (studio, observer)
}

fn key_store_with_key(store: &MemoryKeyStore) {
    use spritegen_pipeline::key_store::ApiKeyStore;
    store.save(TEST_KEY).unwrap();
}
