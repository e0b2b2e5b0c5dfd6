//! Result types produced by style batches and frame requests.

use serde::Serialize;

use crate::error::GenerationError;
use crate::image_data::DataUrl;
use crate::reference::ReferenceToken;

/// Outcome of one style request inside a batch. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success {
        style_id: String,
        image_data_url: DataUrl,
    },
    Failure {
        style_id: String,
        error_message: String,
    },
}

impl GenerationResult {
    /// Tag a finished call with its style id.
    pub fn from_outcome(style_id: &str, outcome: Result<DataUrl, GenerationError>) -> Self {
        match outcome {
            Ok(image_data_url) => Self::Success {
                style_id: style_id.to_string(),
                image_data_url,
            },
            Err(e) => Self::Failure {
                style_id: style_id.to_string(),
                error_message: e.to_string(),
            },
        }
    }

    pub fn style_id(&self) -> &str {
        match self {
            Self::Success { style_id, .. } | Self::Failure { style_id, .. } => style_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The generated image, if this entry succeeded.
    pub fn image(&self) -> Option<&DataUrl> {
        match self {
            Self::Success { image_data_url, .. } => Some(image_data_url),
            Self::Failure { .. } => None,
        }
    }
}

/// Every entry of one style fan-out, in style-set order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleBatch {
    pub reference_token: ReferenceToken,
    pub results: Vec<GenerationResult>,
}

impl StyleBatch {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// One generated animation frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameResult {
    pub style_id: String,
    pub action_id: String,
    pub frame_index: u32,
    pub image_data_url: DataUrl,
}

/// Frames produced by a sequential run, stopping at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    pub reference_token: ReferenceToken,
    pub frames: Vec<FrameResult>,
    /// Index and error of the frame that stopped the run, if any.
    pub failure: Option<(u32, GenerationError)>,
}

impl FrameSequence {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}
