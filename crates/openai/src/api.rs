//! REST API client for the OpenAI image and chat endpoints.
//!
//! Wraps `POST /images/generations`, `POST /images/edits` and
//! `POST /chat/completions` using [`reqwest`]. Every image result is
//! returned as a PNG data URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use spritegen_core::api_key::ApiKey;
use spritegen_core::error::GenerationError;
use spritegen_core::image_data::{DataUrl, ReferenceImage};
use spritegen_core::model::{
    ImageModel, DEFAULT_CLASSIFIER_MODEL, IMAGES_PER_REQUEST, IMAGE_SIZE, RESPONSE_FORMAT_B64,
};

use crate::client::GenerationClient;
use crate::payloads::{
    ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope, ImageGenerationRequest, ImagesResponse,
};

/// Public OpenAI API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Reply budget for a single category keyword.
const CLASSIFY_MAX_TOKENS: u32 = 10;

/// Classification should be as deterministic as the endpoint allows.
const CLASSIFY_TEMPERATURE: f32 = 0.0;

/// HTTP client for the OpenAI API.
pub struct OpenAIApi {
    client: reqwest::Client,
    api_url: String,
    chat_model: String,
}

impl OpenAIApi {
    /// Create a client with a per-request timeout.
    ///
    /// * `api_url` - Base URL without trailing slash, e.g.
    ///   [`DEFAULT_API_URL`].
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            chat_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
        }
    }

    /// Use a different chat model for [`GenerationClient::classify`].
    pub fn with_chat_model(mut self, chat_model: impl Into<String>) -> Self {
        self.chat_model = chat_model.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure the body
    /// is read and its `error.message` (if any) becomes the error message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "OpenAI API error");
            return Err(GenerationError::remote(
                status.as_u16(),
                ErrorEnvelope::message_from(&body),
            ));
        }
        Ok(response)
    }

    /// Read a successful body and parse it, reporting malformed JSON as a
    /// format error rather than a transport error.
    async fn parse_body<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenerationError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await.map_err(transport)?;
        serde_json::from_str(&text).map_err(|e| GenerationError::Format(e.to_string()))
    }

    /// Turn an images response into a data URL.
    async fn image_from_response(response: reqwest::Response) -> Result<DataUrl, GenerationError> {
        let parsed: ImagesResponse = Self::parse_body(response).await?;
        parsed
            .first_b64()
            .map(DataUrl::from_png_base64)
            .ok_or_else(|| GenerationError::Format("missing data[0].b64_json".to_string()))
    }
}

#[async_trait]
impl GenerationClient for OpenAIApi {
    async fn generate_from_text(
        &self,
        model: ImageModel,
        prompt: &str,
        api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError> {
        tracing::debug!(model = %model, prompt_length = prompt.len(), "Calling image generation");

        let body = ImageGenerationRequest {
            model: model.wire_id(),
            prompt,
            n: IMAGES_PER_REQUEST,
            size: IMAGE_SIZE,
            quality: model.quality(),
            response_format: RESPONSE_FORMAT_B64,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_url))
            .bearer_auth(api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        Self::image_from_response(response).await
    }

    async fn edit_with_reference(
        &self,
        model: ImageModel,
        prompt: &str,
        image: Option<&ReferenceImage>,
        api_key: &ApiKey,
    ) -> Result<DataUrl, GenerationError> {
        if image.is_none() && model.requires_reference() {
            return Err(GenerationError::MissingInput(format!(
                "{model} edits require a reference image"
            )));
        }

        tracing::debug!(
            model = %model,
            prompt_length = prompt.len(),
            has_image = image.is_some(),
            "Calling image edit",
        );

        let mut form = Form::new()
            .text("model", model.wire_id())
            .text("prompt", prompt.to_string())
            .text("n", IMAGES_PER_REQUEST.to_string())
            .text("size", IMAGE_SIZE)
            .text("response_format", RESPONSE_FORMAT_B64);

        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(transport)?;
            form = form.part("image", part);
        }

        let response = self
            .client
            .post(format!("{}/images/edits", self.api_url))
            .bearer_auth(api_key.expose())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        Self::image_from_response(response).await
    }

    async fn classify(
        &self,
        prompt_text: &str,
        api_key: &ApiKey,
    ) -> Result<String, GenerationError> {
        tracing::debug!(model = %self.chat_model, "Calling chat classification");

        let body = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt_text,
            }],
            max_tokens: CLASSIFY_MAX_TOKENS,
            temperature: CLASSIFY_TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let parsed: ChatResponse = Self::parse_body(response).await?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| GenerationError::Format("missing choices[0].message.content".to_string()))
    }
}

fn transport(e: reqwest::Error) -> GenerationError {
    GenerationError::Transport(e.to_string())
}
