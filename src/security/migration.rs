//! Re-encryption of the application stores on a mode change
//!
//! New ciphertexts are staged under `<store>.pending` while the old
//! configuration is still in force. Once the new configuration is committed
//! the staged blobs are promoted over the live ones. A staged blob is only
//! ever promoted if it decrypts under the key currently in use, so a crash at
//! any point leaves every store readable under whichever configuration won.

use serde::Serialize;
use tracing::{debug, warn};

use crate::crypto::{decrypt, encrypt, SymmetricKey};
use crate::error::VaultResult;
use crate::storage::{KeyValueStore, StoreKind};

/// A store that could not be carried over to the new key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub store: StoreKind,
    pub reason: String,
}

/// Outcome of re-encrypting the stores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Stores re-encrypted under the new key
    pub migrated: Vec<StoreKind>,
    /// Stores left untouched because they did not decrypt under the old key
    pub failed: Vec<MigrationFailure>,
    /// Stores with no data
    pub absent: Vec<StoreKind>,
}

impl MigrationReport {
    /// True when no store failed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Re-encrypt every present store from `old_key` to `new_key` into staging.
///
/// Decryption failures are recorded per store and do not stop the others.
/// Storage and encryption errors abort, leaving live blobs untouched.
pub(crate) fn stage_reencryption(
    store: &dyn KeyValueStore,
    old_key: &SymmetricKey,
    new_key: &SymmetricKey,
) -> VaultResult<MigrationReport> {
    discard_staged(store)?;

    let mut report = MigrationReport::default();

    for kind in StoreKind::ALL {
        let Some(blob) = store.get(kind.storage_key())? else {
            report.absent.push(kind);
            continue;
        };

        match decrypt(&blob, old_key) {
            Ok(plaintext) => {
                let reencrypted = encrypt(&plaintext, new_key)?;
                store.set(&kind.pending_key(), &reencrypted)?;
                debug!(store = %kind, "staged re-encrypted blob");
                report.migrated.push(kind);
            }
            Err(e) => {
                warn!(store = %kind, error = %e, "store could not be migrated and was left as is");
                report.failed.push(MigrationFailure {
                    store: kind,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Promote staged blobs that decrypt under `key`; drop the rest.
///
/// Returns the stores whose live blob was replaced.
pub(crate) fn recover_staged(
    store: &dyn KeyValueStore,
    key: &SymmetricKey,
) -> VaultResult<Vec<StoreKind>> {
    let mut promoted = Vec::new();

    for kind in StoreKind::ALL {
        let pending_key = kind.pending_key();
        let Some(staged) = store.get(&pending_key)? else {
            continue;
        };

        if decrypt(&staged, key).is_ok() {
            store.set(kind.storage_key(), &staged)?;
            promoted.push(kind);
            debug!(store = %kind, "promoted staged blob");
        } else {
            debug!(store = %kind, "discarding staged blob from an abandoned mode change");
        }
        store.remove(&pending_key)?;
    }

    Ok(promoted)
}

/// Remove all staged blobs
pub(crate) fn discard_staged(store: &dyn KeyValueStore) -> VaultResult<()> {
    for kind in StoreKind::ALL {
        store.remove(&kind.pending_key())?;
    }
    Ok(())
}
