//! In-memory key-value store

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{VaultError, VaultResult};

use super::KeyValueStore;

/// Key-value store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.remove(key);
        Ok(())
    }

    fn keys(&self) -> VaultResult<Vec<String>> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let mut keys: Vec<_> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
