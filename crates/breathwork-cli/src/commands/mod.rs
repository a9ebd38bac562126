pub mod breathe;
pub mod checkin;
pub mod config;
pub mod dogood;
pub mod premium;
pub mod quote;
pub mod stats;
pub mod technique;
pub mod wave;

use breathwork_core::error::StorageError;
use breathwork_core::{Database, KeyValueStore, MemoryStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Key-value backend for commands that must keep working without a
/// database. Falls back to a session-only store when it cannot be opened.
pub enum Store {
    Database(Database),
    Memory(MemoryStore),
}

impl Store {
    pub fn open() -> Self {
        match Database::open() {
            Ok(db) => Store::Database(db),
            Err(e) => {
                tracing::warn!(error = %e, "database unavailable, nothing will be persisted");
                Store::Memory(MemoryStore::new())
            }
        }
    }

    pub fn database(&self) -> Option<&Database> {
        match self {
            Store::Database(db) => Some(db),
            Store::Memory(_) => None,
        }
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Store::Database(db) => db.get(key),
            Store::Memory(mem) => mem.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Store::Database(db) => db.set(key, value),
            Store::Memory(mem) => mem.set(key, value),
        }
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
