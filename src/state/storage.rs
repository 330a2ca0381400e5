//! Durable key-value slot for the persisted session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store writes one JSON document on every mutation and reads it
//! once at start. `FileStorage` keeps it on disk for the CLI;
//! `MemoryStorage` backs tests and throwaway sessions.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single durable slot holding a raw JSON string.
pub trait SessionStorage: Send + Sync {
    /// Read the slot. `Ok(None)` when nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot exists but cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be written.
    fn write(&self, raw: &str) -> Result<(), StorageError>;
}

/// Load and decode the slot as JSON.
///
/// # Errors
///
/// Returns [`StorageError`] on read failure or invalid JSON.
pub fn load_json<T: DeserializeOwned>(storage: &dyn SessionStorage) -> Result<Option<T>, StorageError> {
    match storage.read()? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and write it to the slot.
///
/// # Errors
///
/// Returns [`StorageError`] on encode or write failure.
pub fn save_json<T: Serialize>(storage: &dyn SessionStorage, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.write(&raw)
}

// =============================================================================
// FILE
// =============================================================================

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves a half-written session.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(raw: impl Into<String>) -> Self {
        Self { slot: Mutex::new(Some(raw.into())), writes: Mutex::new(0) }
    }

    /// Current raw contents of the slot.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of writes since construction.
    #[must_use]
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.raw())
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw.to_owned());
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<S> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        (**self).write(raw)
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
