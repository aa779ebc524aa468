//! Key-value persistence for stats and history.
//!
//! The dashboard stores two JSON documents under fixed keys. Anything that
//! can get and set strings by key can back it.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StorageError;

/// Database location used when none is configured.
pub const DEFAULT_DB_PATH: &str = ".sentinel/sentinel.db";

/// Key of the serialized [`WorkflowStats`](crate::workflow::WorkflowStats).
pub const STATS_KEY: &str = "sentinel_stats";

/// Key of the serialized [`History`](crate::workflow::History).
pub const HISTORY_KEY: &str = "sentinel_history";

/// String key-value store.
pub trait KeyValueStore: Send {
    /// Returns the value for `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
