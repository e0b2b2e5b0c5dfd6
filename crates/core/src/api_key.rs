//! Bearer token newtype.

use std::fmt;

use crate::error::GenerationError;

/// A non-empty, trimmed OpenAI API key.
///
/// Constructing one is the only place [`GenerationError::Auth`] is raised,
/// so a missing key is always detected before a request leaves the process.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate a raw key string.
    pub fn parse(raw: &str) -> Result<Self, GenerationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::Auth);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Validate an optional key, treating `None` as missing.
    pub fn from_option(raw: Option<&str>) -> Result<Self, GenerationError> {
        Self::parse(raw.unwrap_or_default())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(3).collect();
        write!(f, "ApiKey({visible}***)")
    }
}
