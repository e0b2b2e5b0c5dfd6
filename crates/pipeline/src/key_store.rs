//! Persistence for the user-entered API key.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use spritegen_core::error::CoreError;

/// Name the key is stored under.
pub const API_KEY_STORAGE_KEY: &str = "openai_api_key";

/// Storage for a single API key string.
pub trait ApiKeyStore: Send + Sync {
    /// The stored key, or `None` if nothing (or only whitespace) was saved.
    fn load(&self) -> Result<Option<String>, CoreError>;

    /// Persist `key`, trimmed. An empty key clears the slot.
    fn save(&self, key: &str) -> Result<(), CoreError>;
}

fn normalize(key: &str) -> Option<String> {
    let trimmed = key.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    slot: Mutex<Option<String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiKeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| CoreError::Internal("API key store lock poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, key: &str) -> Result<(), CoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| CoreError::Internal("API key store lock poisoned".into()))?;
        *slot = normalize(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Stores the key as the sole content of a file.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under [`API_KEY_STORAGE_KEY`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(API_KEY_STORAGE_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ApiKeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(normalize(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to read API key from {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, key: &str) -> Result<(), CoreError> {
        let result = match normalize(key) {
            Some(key) => std::fs::write(&self.path, key),
            None => match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        result.map_err(|e| {
            CoreError::Internal(format!(
                "Failed to write API key to {}: {e}",
                self.path.display()
            ))
        })?;
        tracing::debug!(path = %self.path.display(), "API key saved");
        Ok(())
    }
}
