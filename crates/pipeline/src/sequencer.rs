//! Animation frame generation.
//!
//! [`FrameSequencer::generate_frame`] issues exactly one call per frame and
//! does not enforce ordering: callers must only request a continuation
//! frame after its predecessor completed. [`FrameSequencer::generate_sequence`]
//! honours that contract by requesting frames strictly one after another.

use std::sync::Arc;

use spritegen_core::api_key::ApiKey;
use spritegen_core::error::GenerationError;
use spritegen_core::generation::{FrameResult, FrameSequence, GenerationResult};
use spritegen_core::image_data::ReferenceImage;
use spritegen_core::model::ImageModel;
use spritegen_core::prompt::{build_prompt, FrameSpec};
use spritegen_core::reference::ReferenceToken;
use spritegen_openai::client::GenerationClient;

use crate::events::{CallTarget, GenerationEvent, GenerationObserver, Operation};

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

/// Where a frame's reference image may come from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSources<'a> {
    /// Image explicitly uploaded by the user. Takes precedence.
    pub uploaded: Option<&'a ReferenceImage>,
    /// Results of the last style batch.
    pub generated_styles: &'a [GenerationResult],
}

impl ReferenceSources<'_> {
    /// Resolve the reference for `style_id`: the uploaded image, else the
    /// generated style image with the same id.
    pub fn resolve(&self, style_id: &str) -> Result<ReferenceImage, GenerationError> {
        if let Some(uploaded) = self.uploaded {
            return Ok(uploaded.clone());
        }

        let generated = self
            .generated_styles
            .iter()
            .find(|r| r.style_id() == style_id)
            .and_then(GenerationResult::image)
            .ok_or_else(|| {
                GenerationError::MissingInput(format!(
                    "No source image or generated {style_id} style available"
                ))
            })?;

        ReferenceImage::from_data_url(generated, format!("{style_id}.png")).map_err(|e| {
            GenerationError::MissingInput(format!("Stored {style_id} style image is unreadable: {e}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Frame request
// ---------------------------------------------------------------------------

/// Everything that identifies one frame of one style.
#[derive(Debug, Clone)]
pub struct FrameRequest<'a> {
    pub style_id: &'a str,
    pub frame: FrameSpec,
    pub character_description: &'a str,
    pub reference_token: &'a ReferenceToken,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Issues one generation call per requested frame.
pub struct FrameSequencer {
    client: Arc<dyn GenerationClient>,
    observer: Arc<dyn GenerationObserver>,
}

impl FrameSequencer {
    pub fn new(client: Arc<dyn GenerationClient>, observer: Arc<dyn GenerationObserver>) -> Self {
        Self { client, observer }
    }

    /// Generate a single frame.
    ///
    /// Edit-based models need a reference image (see
    /// [`ReferenceSources::resolve`]) and fail with
    /// [`GenerationError::MissingInput`] without one; text-only models
    /// ignore `sources`.
    pub async fn generate_frame(
        &self,
        api_key: &str,
        model: ImageModel,
        request: &FrameRequest<'_>,
        sources: &ReferenceSources<'_>,
    ) -> Result<FrameResult, GenerationError> {
        let api_key = ApiKey::parse(api_key)?;
        let reference = if model.requires_reference() {
            Some(sources.resolve(request.style_id)?)
        } else {
            None
        };
        self.call(&api_key, model, request, reference.as_ref()).await
    }

    /// Generate frames `0..frame_count` of one action in order, each with
    /// the default continuation flag.
    ///
    /// Preconditions (key, reference image) fail the whole call. A failing
    /// frame stops the run: later frames would continue from a frame that
    /// does not exist. The frames produced so far are returned alongside the
    /// failure.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_sequence(
        &self,
        api_key: &str,
        model: ImageModel,
        style_id: &str,
        action_id: &str,
        frame_count: u32,
        character_description: &str,
        reference_token: &ReferenceToken,
        sources: &ReferenceSources<'_>,
    ) -> Result<FrameSequence, GenerationError> {
        let api_key = ApiKey::parse(api_key)?;
        let reference = if model.requires_reference() {
            Some(sources.resolve(style_id)?)
        } else {
            None
        };

        tracing::info!(
            style_id,
            action_id,
            frame_count,
            reference_token = %reference_token,
            "Starting frame sequence",
        );

        let mut frames = Vec::with_capacity(frame_count as usize);
        for frame_index in 0..frame_count {
            let request = FrameRequest {
                style_id,
                frame: FrameSpec::new(action_id, frame_index),
                character_description,
                reference_token,
            };
            match self.call(&api_key, model, &request, reference.as_ref()).await {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    return Ok(FrameSequence {
                        reference_token: reference_token.clone(),
                        frames,
                        failure: Some((frame_index, e)),
                    });
                }
            }
        }

        Ok(FrameSequence {
            reference_token: reference_token.clone(),
            frames,
            failure: None,
        })
    }

    /// One frame call, bracketed by lifecycle events.
    async fn call(
        &self,
        api_key: &ApiKey,
        model: ImageModel,
        request: &FrameRequest<'_>,
        reference: Option<&ReferenceImage>,
    ) -> Result<FrameResult, GenerationError> {
        let prompt = build_prompt(
            request.style_id,
            &request.frame,
            request.reference_token,
            request.character_description,
        );

        let target = CallTarget::Frame {
            style_id: request.style_id.to_string(),
            action_id: request.frame.action_id.clone(),
            frame_index: request.frame.frame_index,
        };
        let operation = if reference.is_some() {
            Operation::Edit
        } else {
            Operation::Generate
        };
        self.observer.on_event(&GenerationEvent::CallStarted {
            target: target.clone(),
            operation,
        });

        let outcome = match reference {
            Some(image) => {
                self.client
                    .edit_with_reference(model, &prompt, Some(image), api_key)
                    .await
            }
            None => self.client.generate_from_text(model, &prompt, api_key).await,
        };

        match outcome {
            Ok(image_data_url) => {
                self.observer
                    .on_event(&GenerationEvent::CallSucceeded { target });
                Ok(FrameResult {
                    style_id: request.style_id.to_string(),
                    action_id: request.frame.action_id.clone(),
                    frame_index: request.frame.frame_index,
                    image_data_url,
                })
            }
            Err(e) => {
                self.observer.on_event(&GenerationEvent::CallFailed {
                    target,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
