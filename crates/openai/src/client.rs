//! The three remote operations the pipeline depends on.

use async_trait::async_trait;
use spritegen_core::api_key::ApiKey;
use spritegen_core::error::GenerationError;
use spritegen_core::image_data::{DataUrl, ReferenceImage};
use spritegen_core::model::ImageModel;

/// One request/response per call, no retries.
///
/// Implementations must never retry internally; callers decide how a failed
/// call is reported.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate an image from a text prompt only.
    async fn generate_from_text(
        &self,
        model: ImageModel,
        prompt: &str,
        api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError>;

    /// Generate an image guided by a reference image.
    ///
    /// Fails with [`GenerationError::MissingInput`] when `image` is `None`
    /// and `model` requires a reference.
    async fn edit_with_reference(
        &self,
        model: ImageModel,
        prompt: &str,
        image: Option<&ReferenceImage>,
        api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError>;

    /// Send a classification prompt and return the raw reply text.
    ///
    /// The reply is not validated against any category set.
    async fn classify(&self, prompt_text: &str, api_key: &ApiKey)
        -> Result<String, GenerationError>;
}
