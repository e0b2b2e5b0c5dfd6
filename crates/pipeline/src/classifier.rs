//! Free-text message classification.
//!
//! [`MessageClassifier::classify_message`] is total: a missing key, a
//! transport or remote failure, or a reply outside the category set all
//! degrade to [`Category::Unknown`].

use std::sync::Arc;

use spritegen_core::api_key::ApiKey;
use spritegen_core::category::{build_classification_prompt, parse_classifier_reply, Category};
use spritegen_openai::client::GenerationClient;

use crate::events::{CallTarget, GenerationEvent, GenerationObserver, Operation};

pub struct MessageClassifier {
    client: Arc<dyn GenerationClient>,
    observer: Arc<dyn GenerationObserver>,
}

impl MessageClassifier {
    pub fn new(client: Arc<dyn GenerationClient>, observer: Arc<dyn GenerationObserver>) -> Self {
        Self { client, observer }
    }

    /// Classify one chat message. Never fails.
    pub async fn classify_message(&self, api_key: &str, user_text: &str) -> Category {
        let api_key = match ApiKey::parse(api_key) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "Classification skipped, defaulting to unknown");
                return Category::Unknown;
            }
        };

        let prompt = build_classification_prompt(user_text);
        self.observer.on_event(&GenerationEvent::CallStarted {
            target: CallTarget::Classification,
            operation: Operation::Classify,
        });

        let raw = match self.client.classify(&prompt, &api_key).await {
            Ok(raw) => {
                self.observer.on_event(&GenerationEvent::CallSucceeded {
                    target: CallTarget::Classification,
                });
                raw
            }
            Err(e) => {
                self.observer.on_event(&GenerationEvent::CallFailed {
                    target: CallTarget::Classification,
                    error: e.to_string(),
                });
                return Category::Unknown;
            }
        };

        match parse_classifier_reply(&raw) {
            Some(category) => {
                tracing::debug!(category = %category, id = category.id(), "Valid category found");
                category
            }
            None => {
                tracing::info!(raw = %raw, "Invalid category returned, defaulting to unknown");
                Category::Unknown
            }
        }
    }
}
