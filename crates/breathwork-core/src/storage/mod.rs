mod config;
pub mod database;

pub use config::{Config, DoGoodConfig, PremiumConfig, SessionConfig};
pub use database::{Database, SessionRecord, Stats};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::technique::{self, DEFAULT_TECHNIQUE_ID};

const LAST_TECHNIQUE_KEY: &str = "last_technique";

/// Returns `~/.config/breathwork[-dev]/` based on BREATHWORK_ENV.
///
/// Set BREATHWORK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREATHWORK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("breathwork-dev")
    } else {
        base_dir.join("breathwork")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::Unavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Narrow persistence port: single-key string reads and writes.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Session-only store. Used in tests and as the fallback when the
/// database cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Remembered technique choice. Never fails: storage problems are logged
/// and the in-code default is used instead.
pub struct Preferences<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    fallback: &'static str,
}

impl<'a, S: KeyValueStore + ?Sized> Preferences<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            fallback: DEFAULT_TECHNIQUE_ID,
        }
    }

    /// Use `id` instead of the table default when nothing is stored.
    pub fn with_fallback(mut self, id: &str) -> Self {
        self.fallback = technique::resolve(id).id;
        self
    }

    /// Last chosen technique, resolved against the table.
    pub fn last_technique(&self) -> &'static str {
        match self.store.get(LAST_TECHNIQUE_KEY) {
            Ok(Some(id)) => technique::resolve(&id).id,
            Ok(None) => self.fallback,
            Err(e) => {
                tracing::warn!(error = %e, "could not read last technique, using default");
                self.fallback
            }
        }
    }

    /// Persist `id` if it differs from the stored choice.
    pub fn remember_technique(&self, id: &str) {
        if let Ok(Some(current)) = self.store.get(LAST_TECHNIQUE_KEY) {
            if current == id {
                return;
            }
        }
        if let Err(e) = self.store.set(LAST_TECHNIQUE_KEY, id) {
            tracing::warn!(error = %e, technique = id, "could not persist technique choice");
        }
    }
}
