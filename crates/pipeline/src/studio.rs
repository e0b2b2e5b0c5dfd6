//! The sprite studio: owns application state and drives the workflows.
//!
//! Core components never touch state. The studio snapshots what a call needs,
//! releases the lock, awaits the call, then writes the results back.

use std::sync::Arc;

use spritegen_core::actions::find_action;
use spritegen_core::error::{CoreError, GenerationError};
use spritegen_core::generation::{FrameResult, FrameSequence, StyleBatch};
use spritegen_core::image_data::ReferenceImage;
use spritegen_core::model::ImageModel;
use spritegen_core::prompt::{FrameSpec, DEFAULT_CHARACTER_DESCRIPTION};
use spritegen_core::reference::ReferenceToken;
use spritegen_openai::api::OpenAIApi;
use spritegen_openai::client::GenerationClient;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::classifier::MessageClassifier;
use crate::config::SpriteConfig;
use crate::events::{GenerationObserver, TracingObserver};
use crate::key_store::ApiKeyStore;
use crate::orchestrator::StyleOrchestrator;
use crate::router::{MessageRouter, RouteReply};
use crate::sequencer::{FrameRequest, FrameSequencer, ReferenceSources};
use crate::state::{ApplicationState, StateSummary};

/// Errors surfaced by studio operations.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A new character batch replaced the session the frames belong to.
    #[error("The character changed while frames were generating. Request the animation again")]
    StaleSession,
}

pub type StudioResult<T> = Result<T, StudioError>;

pub struct SpriteStudio {
    config: SpriteConfig,
    state: RwLock<ApplicationState>,
    orchestrator: StyleOrchestrator,
    sequencer: FrameSequencer,
    classifier: MessageClassifier,
    router: MessageRouter,
    key_store: Arc<dyn ApiKeyStore>,
}

impl SpriteStudio {
    /// Build a studio over an arbitrary client.
    ///
    /// A key previously saved in `key_store` takes effect immediately.
    pub fn new(
        config: SpriteConfig,
        client: Arc<dyn GenerationClient>,
        observer: Arc<dyn GenerationObserver>,
        key_store: Arc<dyn ApiKeyStore>,
    ) -> StudioResult<Self> {
        let mut state = ApplicationState::from_config(&config);
        if let Some(saved) = key_store.load()? {
            tracing::debug!("Restored saved API key");
            state.set_api_key(&saved);
        }

        Ok(Self {
            orchestrator: StyleOrchestrator::new(Arc::clone(&client), Arc::clone(&observer)),
            sequencer: FrameSequencer::new(Arc::clone(&client), Arc::clone(&observer)),
            classifier: MessageClassifier::new(client, observer),
            router: MessageRouter::new(),
            state: RwLock::new(state),
            config,
            key_store,
        })
    }

    /// Build a studio talking to the OpenAI API described by `config`,
    /// logging lifecycle events through `tracing`.
    pub fn from_config(config: SpriteConfig, key_store: Arc<dyn ApiKeyStore>) -> StudioResult<Self> {
        let api = OpenAIApi::new(config.api_base_url.as_str(), config.request_timeout())?
            .with_chat_model(config.classifier_model.as_str());
        tracing::info!(
            api_url = %api.api_url(),
            model = %config.image_model,
            timeout_secs = config.request_timeout_secs,
            "Sprite studio configured",
        );
        Self::new(config, Arc::new(api), Arc::new(TracingObserver), key_store)
    }

    pub fn config(&self) -> &SpriteConfig {
        &self.config
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Replace the routing table.
    pub fn with_router(mut self, router: MessageRouter) -> Self {
        self.router = router;
        self
    }

    // -- State --

    /// A copy of the current state.
    pub async fn state(&self) -> ApplicationState {
        self.state.read().await.clone()
    }

    pub async fn summary(&self) -> StateSummary {
        self.state.read().await.summary()
    }

    /// Use `key` for subsequent calls and persist it.
    pub async fn set_api_key(&self, key: &str) -> StudioResult<()> {
        self.key_store.save(key)?;
        self.state.write().await.set_api_key(key);
        Ok(())
    }

    pub async fn select_model(&self, model: ImageModel) {
        tracing::info!(model = %model, "Image model selected");
        self.state.write().await.select_model(model);
    }

    /// Store an uploaded reference image, re-encoded as PNG.
    pub async fn upload_reference_image(&self, image: ReferenceImage) -> StudioResult<()> {
        let png = tokio::task::spawn_blocking(move || image.into_png())
            .await
            .map_err(|e| CoreError::Internal(format!("Image conversion task failed: {e}")))??;
        tracing::info!(file_name = %png.file_name, bytes = png.bytes.len(), "Reference image uploaded");
        self.state.write().await.set_uploaded_image(Some(png));
        Ok(())
    }

    pub async fn clear_reference_image(&self) {
        self.state.write().await.set_uploaded_image(None);
    }

    pub async fn choose_style(&self, style_id: &str) -> StudioResult<()> {
        self.state.write().await.choose_style(style_id)?;
        Ok(())
    }

    // -- Workflows --

    /// Generate every style for a new character and record the batch.
    ///
    /// A blank description falls back to the generic character.
    pub async fn generate_styles(&self, character_description: &str) -> StudioResult<StyleBatch> {
        let description = match character_description.trim() {
            "" => DEFAULT_CHARACTER_DESCRIPTION,
            trimmed => trimmed,
        };

        let (api_key, model, uploaded) = {
            let state = self.state.read().await;
            (
                state.active_api_key().to_string(),
                state.selected_model(),
                state.uploaded_image().cloned(),
            )
        };

        let batch = self
            .orchestrator
            .generate_all_styles(&api_key, model, uploaded.as_ref(), description)
            .await?;

        self.state
            .write()
            .await
            .record_style_batch(batch.clone(), description);
        Ok(batch)
    }

    /// Generate the full frame sequence of `action_id` for the chosen style
    /// (else the first successful style) and record the frames.
    ///
    /// `character_description` defaults to the one used for the last style
    /// batch. Unknown actions are generated as a single frame.
    pub async fn animate(
        &self,
        action_id: &str,
        character_description: Option<&str>,
    ) -> StudioResult<FrameSequence> {
        let snapshot = self.frame_snapshot().await?;
        let description = character_description
            .or(snapshot.description.as_deref())
            .unwrap_or(DEFAULT_CHARACTER_DESCRIPTION);
        let frame_count = find_action(action_id).map_or(1, |action| action.frame_count);

        let sources = ReferenceSources {
            uploaded: snapshot.state.uploaded_image(),
            generated_styles: snapshot.state.generated_styles(),
        };
        let sequence = self
            .sequencer
            .generate_sequence(
                snapshot.state.active_api_key(),
                snapshot.state.selected_model(),
                &snapshot.style_id,
                action_id,
                frame_count,
                description,
                &snapshot.reference_token,
                &sources,
            )
            .await?;

        if let Some((frame_index, error)) = &sequence.failure {
            tracing::warn!(
                action_id,
                frame_index,
                error = %error,
                "Frame sequence stopped early",
            );
        }

        self.session_state(&snapshot.reference_token)
            .await?
            .record_sequence(&sequence)?;
        Ok(sequence)
    }

    /// Generate and record one frame.
    ///
    /// `frame.frame_index` may not skip past the frames already recorded for
    /// the action; this is checked before any call is made.
    pub async fn generate_frame(
        &self,
        frame: FrameSpec,
        character_description: Option<&str>,
    ) -> StudioResult<FrameResult> {
        let snapshot = self.frame_snapshot().await?;
        snapshot
            .state
            .validate_frame_index(&frame.action_id, frame.frame_index)?;
        let description = character_description
            .or(snapshot.description.as_deref())
            .unwrap_or(DEFAULT_CHARACTER_DESCRIPTION);

        let request = FrameRequest {
            style_id: &snapshot.style_id,
            frame,
            character_description: description,
            reference_token: &snapshot.reference_token,
        };
        let sources = ReferenceSources {
            uploaded: snapshot.state.uploaded_image(),
            generated_styles: snapshot.state.generated_styles(),
        };
        let result = self
            .sequencer
            .generate_frame(
                snapshot.state.active_api_key(),
                snapshot.state.selected_model(),
                &request,
                &sources,
            )
            .await?;

        self.session_state(&snapshot.reference_token)
            .await?
            .record_frame(result.clone())?;
        Ok(result)
    }

    /// Classify `message` and dispatch it to the matching handler.
    ///
    /// Never fails: handler errors come back as an unsuccessful reply.
    pub async fn route_message(&self, message: &str) -> RouteReply {
        let api_key = self.state.read().await.active_api_key().to_string();
        let category = self.classifier.classify_message(&api_key, message).await;
        tracing::info!(category = %category, "Routing message");

        let handler = self.router.handler_for(category);
        match handler(self, category, message).await {
            Ok(reply) => RouteReply {
                category,
                succeeded: true,
                message: reply,
            },
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "Message handler failed");
                RouteReply {
                    category,
                    succeeded: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Write access to state, provided `token` still names the current
    /// character. Frames generated for a replaced character are discarded.
    async fn session_state(
        &self,
        token: &ReferenceToken,
    ) -> StudioResult<RwLockWriteGuard<'_, ApplicationState>> {
        let state = self.state.write().await;
        if state.current_reference_token() != Some(token) {
            tracing::warn!(reference_token = %token, "Discarding frames of a replaced character");
            return Err(StudioError::StaleSession);
        }
        Ok(state)
    }

    /// Copy what a frame call needs out of state.
    async fn frame_snapshot(&self) -> StudioResult<FrameSnapshot> {
        let state = self.state.read().await.clone();
        let style_id = state
            .effective_style()
            .ok_or_else(|| {
                GenerationError::MissingInput(
                    "No character style available. Generate a character first".into(),
                )
            })?
            .to_string();
        let reference_token = state.current_reference_token().cloned().ok_or_else(|| {
            GenerationError::MissingInput("No reference token recorded for the current character".into())
        })?;
        let description = state.character_description().map(str::to_string);
        Ok(FrameSnapshot {
            state,
            style_id,
            reference_token,
            description,
        })
    }
}

struct FrameSnapshot {
    state: ApplicationState,
    style_id: String,
    reference_token: ReferenceToken,
    description: Option<String>,
}
