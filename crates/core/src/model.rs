//! Image model selection and the fixed request parameters per model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Output size requested for every image.
pub const IMAGE_SIZE: &str = "1024x1024";
/// Number of images requested per call.
pub const IMAGES_PER_REQUEST: u32 = 1;
/// Response encoding requested for every image call.
pub const RESPONSE_FORMAT_B64: &str = "b64_json";
/// Default chat model used for message classification.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// The image model family a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageModel {
    /// Text-to-image only.
    #[serde(rename = "dall-e-3")]
    DallE3,
    /// Supports editing with a reference image.
    #[default]
    #[serde(rename = "gpt-image-1")]
    GptImage1,
}

impl ImageModel {
    /// Model id sent on the wire.
    pub fn wire_id(self) -> &'static str {
        match self {
            Self::DallE3 => "dall-e-3",
            Self::GptImage1 => "gpt-image-1",
        }
    }

    /// Quality parameter sent with generation requests.
    pub fn quality(self) -> &'static str {
        match self {
            Self::DallE3 => "standard",
            Self::GptImage1 => "high",
        }
    }

    /// Whether frame generation goes through the edit endpoint and therefore
    /// needs a reference image.
    pub fn requires_reference(self) -> bool {
        matches!(self, Self::GptImage1)
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

impl FromStr for ImageModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dall-e-3" | "dalle3" | "dall-e" => Ok(Self::DallE3),
            "gpt-image-1" | "gpt-image" => Ok(Self::GptImage1),
            other => Err(CoreError::Validation(format!(
                "Unknown image model '{other}'. Must be one of: dall-e-3, gpt-image-1"
            ))),
        }
    }
}
