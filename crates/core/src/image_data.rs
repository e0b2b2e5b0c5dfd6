//! Self-contained image payloads.
//!
//! Every image call returns a [`DataUrl`] so results are usable by the UI
//! without a second fetch. Reference inputs travel as [`ReferenceImage`]
//! bytes, decoded from an upload or from a previously generated data URL.

use std::fmt;
use std::io::Cursor;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MIME type of every image returned by the remote API.
pub const PNG_MIME: &str = "image/png";

/// `data:<mime>[;params];base64,<payload>`.
static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+)(?:;[^,;]+)*;base64,(?P<data>.*)$")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// DataUrl
// ---------------------------------------------------------------------------

/// A base64 data URL embedding an image.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    /// Wrap a base64 PNG payload as returned under `b64_json`.
    pub fn from_png_base64(b64: &str) -> Self {
        Self(format!("data:{PNG_MIME};base64,{b64}"))
    }

    /// Validate and wrap an existing data URL string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if !DATA_URL_RE.is_match(&raw) {
            return Err(CoreError::Validation("Invalid data URL format".to_string()));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the URL header.
    pub fn mime_type(&self) -> &str {
        DATA_URL_RE
            .captures(&self.0)
            .and_then(|c| c.name("mime"))
            .map_or(PNG_MIME, |m| m.as_str())
    }

    /// Decode the embedded payload.
    pub fn decode(&self) -> Result<Vec<u8>, CoreError> {
        let payload = DATA_URL_RE
            .captures(&self.0)
            .and_then(|c| c.name("data"))
            .map(|m| m.as_str())
            .ok_or_else(|| CoreError::Validation("Invalid data URL format".to_string()))?;
        STANDARD
            .decode(payload.trim())
            .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))
    }
}

impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(32).collect();
        write!(f, "DataUrl({head}... {} bytes)", self.0.len())
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ReferenceImage
// ---------------------------------------------------------------------------

/// Binary image handed to the edit endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Decode a data URL into a reference image named `file_name`.
    pub fn from_data_url(url: &DataUrl, file_name: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            bytes: url.decode()?,
            mime_type: url.mime_type().to_string(),
            file_name: file_name.into(),
        })
    }

    /// Re-encode as an RGBA PNG, preserving transparency.
    ///
    /// PNG inputs are returned unchanged. The file extension is rewritten to
    /// `.png`.
    pub fn into_png(self) -> Result<Self, CoreError> {
        if self.mime_type == PNG_MIME {
            return Ok(self);
        }

        let decoded = image::load_from_memory(&self.bytes)
            .map_err(|e| CoreError::Validation(format!("Failed to load image: {e}")))?;
        let mut out = Cursor::new(Vec::new());
        decoded
            .to_rgba8()
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| CoreError::Validation(format!("Failed to encode PNG: {e}")))?;

        let stem = self
            .file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem);

        Ok(Self {
            bytes: out.into_inner(),
            mime_type: PNG_MIME.to_string(),
            file_name: format!("{stem}.png"),
        })
    }
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
