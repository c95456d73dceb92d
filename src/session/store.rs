//! Durable key/value session storage.
//!
//! DESIGN
//! ======
//! The store is deliberately dumb: three string keys written independently
//! with no transactions. `Session` in `model.rs` gives the keys meaning.
//!
//! TRADE-OFFS
//! ==========
//! `FileStore` rewrites the whole file on every mutation (write to a sibling
//! temp file, then rename). The file holds three short strings, so the cost
//! is irrelevant and a crash never leaves a torn JSON document behind.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ApiError;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Every key a session writes. Clearing a session removes all of them.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-file store that survives process restarts.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the file exists but cannot be read or
    /// is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| ApiError::Storage(format!("corrupt session file {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ApiError::Storage(format!("read {}: {e}", path.display()))),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "session file opened");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| ApiError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| ApiError::Storage(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ApiError::Storage(format!("rename to {}: {e}", self.path.display())))
    }

    fn mutate<F>(&self, apply: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        apply(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        if self.get(key).is_none() {
            return Ok(());
        }
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
