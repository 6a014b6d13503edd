//! Encrypted JSON documents
//!
//! Each application store is one JSON document encrypted as a whole under
//! the session key. Loads decrypt everything; saves re-encrypt everything
//! and replace the blob.

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::crypto::{decrypt, encrypt, SymmetricKey};
use crate::error::{VaultError, VaultResult};
use crate::security::SessionManager;
use crate::storage::{KeyValueStore, StoreKind};

/// A whole-document encrypted store of `T`.
///
/// Handles are cheap views; every handle for the same store shares one
/// write lock, so saves from different handles never interleave.
pub struct EncryptedDocument<'a, T> {
    kind: StoreKind,
    store: &'a dyn KeyValueStore,
    write_lock: &'a Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> EncryptedDocument<'a, T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a document bound to `kind`'s storage key, guarded by `write_lock`
    pub fn new(kind: StoreKind, store: &'a dyn KeyValueStore, write_lock: &'a Mutex<()>) -> Self {
        Self {
            kind,
            store,
            write_lock,
            _marker: PhantomData,
        }
    }

    /// The session's document for `kind`
    pub fn for_session(session: &'a SessionManager, kind: StoreKind) -> Self {
        Self::new(kind, session.store().as_ref(), session.store_lock(kind))
    }

    /// Load and decrypt the document.
    ///
    /// Missing data gives `T::default()`. Data that fails to decrypt or
    /// parse also gives `T::default()` so a damaged store never blocks
    /// the app; the next save overwrites it.
    pub fn load(&self, key: &SymmetricKey) -> VaultResult<T> {
        let Some(blob) = self.store.get(self.kind.storage_key())? else {
            return Ok(T::default());
        };

        let plaintext = match decrypt(&blob, key) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(store = %self.kind, error = %e, "unreadable store, starting empty");
                return Ok(T::default());
            }
        };

        match serde_json::from_str(&plaintext) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(store = %self.kind, error = %e, "unparseable store, starting empty");
                Ok(T::default())
            }
        }
    }

    /// Encrypt and replace the whole document
    pub fn save(&self, key: &SymmetricKey, value: &T) -> VaultResult<()> {
        let _guard = self.lock_writes()?;
        self.write(key, value)
    }

    /// Load, modify and save as one step, serialised against other writes
    pub fn update<R, F>(&self, key: &SymmetricKey, f: F) -> VaultResult<R>
    where
        F: FnOnce(&mut T) -> VaultResult<R>,
    {
        let _guard = self.lock_writes()?;
        let mut value = self.load(key)?;
        let result = f(&mut value)?;
        self.write(key, &value)?;
        Ok(result)
    }

    fn lock_writes(&self) -> VaultResult<MutexGuard<'a, ()>> {
        self.write_lock.lock().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire {} write lock: {}", self.kind, e))
        })
    }

    fn write(&self, key: &SymmetricKey, value: &T) -> VaultResult<()> {
        let json = serde_json::to_string(value)?;
        let blob = encrypt(&json, key)?;
        self.store.set(self.kind.storage_key(), &blob)
    }
}
