use serde::Serialize;

/// Domain-level validation errors raised by the pure core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single member failure inside a fan-out batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCause {
    /// Style the failed call was generating.
    pub style_id: String,
    /// Human-readable failure description.
    pub message: String,
}

/// Outcome taxonomy for every remote generation call.
///
/// Per-item failures inside a fan-out are captured as data
/// ([`GenerationResult::Failure`](crate::generation::GenerationResult));
/// only a batch in which every member failed surfaces as
/// [`GenerationError::BatchFailure`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No usable API key. Detected locally before any request is sent.
    #[error("Please enter your OpenAI API key")]
    Auth,

    /// The remote endpoint answered with a non-2xx status.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message from the error object, or a status-based fallback.
        message: String,
    },

    /// A 2xx response without the expected payload field.
    #[error("Invalid response format from OpenAI API: {0}")]
    Format(String),

    /// A reference image was required but none was available.
    #[error("Missing input image: {0}")]
    MissingInput(String),

    /// The request never produced a response (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Every member of a fan-out failed.
    #[error("Failed to generate any styles ({} failures). Please check your API key and try again.", causes.len())]
    BatchFailure { causes: Vec<BatchCause> },
}

impl GenerationError {
    /// Build a [`GenerationError::Remote`] from a status code and an
    /// optional message extracted from the error body.
    pub fn remote(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("API call failed with status {status}"));
        Self::Remote { status, message }
    }
}
