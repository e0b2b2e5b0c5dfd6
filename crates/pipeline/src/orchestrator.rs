//! Style fan-out: one generation call per style, all in flight at once.
//!
//! Every call is awaited to a terminal state before the batch resolves; a
//! failing style never aborts or cancels its siblings. Results come back in
//! style-set order regardless of completion order.

use std::sync::Arc;

use futures::future::join_all;
use spritegen_core::api_key::ApiKey;
use spritegen_core::error::{BatchCause, GenerationError};
use spritegen_core::generation::{GenerationResult, StyleBatch};
use spritegen_core::image_data::{DataUrl, ReferenceImage};
use spritegen_core::model::ImageModel;
use spritegen_core::prompt::build_style_prompt;
use spritegen_core::reference::ReferenceToken;
use spritegen_core::styles::{StyleDescriptor, STYLES};
use spritegen_openai::client::GenerationClient;

use crate::events::{CallTarget, GenerationEvent, GenerationObserver, Operation};

/// Issues one call per style and aggregates a partial-success batch.
pub struct StyleOrchestrator {
    client: Arc<dyn GenerationClient>,
    observer: Arc<dyn GenerationObserver>,
    styles: Vec<StyleDescriptor>,
}

impl StyleOrchestrator {
    /// Orchestrator over the fixed [`STYLES`] set.
    pub fn new(client: Arc<dyn GenerationClient>, observer: Arc<dyn GenerationObserver>) -> Self {
        Self::with_styles(client, observer, STYLES.to_vec())
    }

    /// Orchestrator over a caller-supplied style set.
    pub fn with_styles(
        client: Arc<dyn GenerationClient>,
        observer: Arc<dyn GenerationObserver>,
        styles: Vec<StyleDescriptor>,
    ) -> Self {
        Self {
            client,
            observer,
            styles,
        }
    }

    pub fn styles(&self) -> &[StyleDescriptor] {
        &self.styles
    }

    /// Generate every style for one character.
    ///
    /// Fails with [`GenerationError::Auth`] before any call when `api_key`
    /// is blank, and with [`GenerationError::BatchFailure`] only when every
    /// style failed. Any mix with at least one success is returned as data.
    pub async fn generate_all_styles(
        &self,
        api_key: &str,
        model: ImageModel,
        reference_input: Option<&ReferenceImage>,
        character_description: &str,
    ) -> Result<StyleBatch, GenerationError> {
        let api_key = ApiKey::parse(api_key)?;
        let reference_token = ReferenceToken::mint();
        let reference = reference_input.filter(|_| model.requires_reference());

        tracing::info!(
            reference_token = %reference_token,
            style_count = self.styles.len(),
            use_edit = reference.is_some(),
            "Starting style batch",
        );

        let calls = self.styles.iter().map(|style| {
            let prompt = build_style_prompt(style.id, &reference_token, character_description);
            let api_key = &api_key;
            async move {
                let outcome = self
                    .generate_one(style.id, &prompt, model, reference, api_key)
                    .await;
                GenerationResult::from_outcome(style.id, outcome)
            }
        });

        let results = join_all(calls).await;
        let batch = StyleBatch {
            reference_token,
            results,
        };

        self.observer.on_event(&GenerationEvent::BatchCompleted {
            reference_token: batch.reference_token.to_string(),
            succeeded: batch.succeeded(),
            failed: batch.failed(),
        });

        if batch.succeeded() == 0 {
            let causes = batch
                .results
                .iter()
                .filter_map(|r| match r {
                    GenerationResult::Failure {
                        style_id,
                        error_message,
                    } => Some(BatchCause {
                        style_id: style_id.clone(),
                        message: error_message.clone(),
                    }),
                    GenerationResult::Success { .. } => None,
                })
                .collect();
            return Err(GenerationError::BatchFailure { causes });
        }

        Ok(batch)
    }

    /// One style call, bracketed by lifecycle events.
    async fn generate_one(
        &self,
        style_id: &str,
        prompt: &str,
        model: ImageModel,
        reference: Option<&ReferenceImage>,
        api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError> {
        let target = CallTarget::Style {
            style_id: style_id.to_string(),
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
                    .edit_with_reference(model, prompt, Some(image), api_key)
                    .await
            }
            None => self.client.generate_from_text(model, prompt, api_key).await,
        };

        match &outcome {
            Ok(_) => self
                .observer
                .on_event(&GenerationEvent::CallSucceeded { target }),
            Err(e) => self.observer.on_event(&GenerationEvent::CallFailed {
                target,
                error: e.to_string(),
            }),
        }
        outcome
    }
}
