//! Storage layer for pomovault
//!
//! A flat string key-value store, the same shape as browser local storage.
//! Every persisted value (the security configuration and each encrypted
//! blob) is a single string under its own key.

pub mod file_io;
pub mod file_store;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::VaultResult;

pub use file_store::FileStore;
pub use memory::MemoryStore;

/// Key holding the security configuration record
pub const SECURITY_CONFIG_KEY: &str = "security_config";

/// Suffix for blobs staged during a mode change
pub const PENDING_SUFFIX: &str = ".pending";

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> VaultResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> VaultResult<()>;

    /// Remove `key`; removing an absent key succeeds
    fn remove(&self, key: &str) -> VaultResult<()>;

    /// List all stored keys
    fn keys(&self) -> VaultResult<Vec<String>>;
}

/// Shared handle to a store
pub type SharedStore = Arc<dyn KeyValueStore>;

/// The encrypted application stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Today's task list
    Tasks,
    /// Task backlog
    Backlog,
    /// In-app settings document
    Settings,
}

impl StoreKind {
    /// All encrypted stores, in migration order
    pub const ALL: [StoreKind; 3] = [StoreKind::Tasks, StoreKind::Backlog, StoreKind::Settings];

    /// Storage key for this store's blob
    pub fn storage_key(self) -> &'static str {
        match self {
            StoreKind::Tasks => "tasks",
            StoreKind::Backlog => "backlog",
            StoreKind::Settings => "settings",
        }
    }

    /// Storage key for this store's staged blob
    pub fn pending_key(self) -> String {
        format!("{}{}", self.storage_key(), PENDING_SUFFIX)
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keys_are_distinct() {
        let keys: Vec<_> = StoreKind::ALL.iter().map(|k| k.storage_key()).collect();
        assert_eq!(keys, vec!["tasks", "backlog", "settings"]);
        assert!(!keys.contains(&SECURITY_CONFIG_KEY));
    }

    #[test]
    fn test_pending_key() {
        assert_eq!(StoreKind::Backlog.pending_key(), "backlog.pending");
    }
}
