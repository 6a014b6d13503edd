//! File-backed key-value store
//!
//! One file per key inside a directory. Writes go through `write_atomic`
//! so a value is always either the old or the new string.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{VaultError, VaultResult};

use super::file_io::{read_string, remove_file_if_exists, write_atomic};
use super::KeyValueStore;

/// Key-value store persisted as files in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating it if needed
    pub fn open(dir: PathBuf) -> VaultResult<Self> {
        fs::create_dir_all(&dir)
            .map_err(|e| VaultError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> VaultResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

/// Keys become file names, so only a safe character set is allowed
fn validate_key(key: &str) -> VaultResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(".tmp")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(VaultError::Validation(format!("Invalid storage key: {:?}", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> VaultResult<Option<String>> {
        let path = self.path_for(key)?;
        debug!(key, "reading value");
        read_string(path)
    }

    fn set(&self, key: &str, value: &str) -> VaultResult<()> {
        let path = self.path_for(key)?;
        debug!(key, bytes = value.len(), "writing value");
        write_atomic(path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> VaultResult<()> {
        let path = self.path_for(key)?;
        debug!(key, "removing value");
        remove_file_if_exists(path)
    }

    fn keys(&self) -> VaultResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VaultError::Storage(format!(
                    "Failed to list {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VaultError::Storage(e.to_string()))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_key(name).is_ok() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("data")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_set_get_remove() {
        let (_dir, store) = store();

        assert_eq!(store.get("tasks").unwrap(), None);
        store.set("tasks", "blob1").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("blob1"));

        store.set("tasks", "blob2").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("blob2"));

        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
        store.remove("tasks").unwrap();
    }

    #[test]
    fn test_keys_listed_sorted() {
        let (_dir, store) = store();
        store.set("tasks", "a").unwrap();
        store.set("backlog.pending", "b").unwrap();
        store.set("security_config", "{}").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["backlog.pending", "security_config", "tasks"]
        );
    }

    #[test]
    fn test_rejects_unsafe_keys() {
        let (_dir, store) = store();
        for key in ["", "../escape", ".hidden", "a/b", "tasks.tmp"] {
            assert!(
                matches!(store.set(key, "x"), Err(VaultError::Validation(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_values_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");

        FileStore::open(dir.clone()).unwrap().set("settings", "v").unwrap();
        let reopened = FileStore::open(dir).unwrap();
        assert_eq!(reopened.get("settings").unwrap().as_deref(), Some("v"));
    }
}
