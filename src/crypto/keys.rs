//! Symmetric keys
//!
//! A 256-bit AES key that zeroes itself on drop. Randomly generated keys are
//! exportable so auto mode can persist them; keys derived from a PIN are not.

use std::fmt;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Key length in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// A symmetric AEAD key held in memory
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
    #[zeroize(skip)]
    exportable: bool,
}

impl SymmetricKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE], exportable: bool) -> Self {
        Self { bytes, exportable }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Whether `export_key` accepts this key
    pub fn is_exportable(&self) -> bool {
        self.exportable
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for SymmetricKey {}

// Never print key material
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("exportable", &self.exportable)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh random 256-bit key, marked exportable
pub fn generate_key() -> SymmetricKey {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    SymmetricKey::from_bytes(bytes, true)
}

/// Export a key as base64 of its raw bytes
pub fn export_key(key: &SymmetricKey) -> VaultResult<String> {
    if !key.exportable {
        return Err(VaultError::Encryption("Key is not exportable".to_string()));
    }
    Ok(STANDARD.encode(key.bytes))
}

/// Import a key previously produced by `export_key`
pub fn import_key(encoded: &str) -> VaultResult<SymmetricKey> {
    let mut raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| VaultError::KeyImport(format!("Invalid key encoding: {}", e)))?;

    if raw.len() != KEY_SIZE {
        let len = raw.len();
        raw.zeroize();
        return Err(VaultError::KeyImport(format!(
            "Invalid key length: expected {}, got {}",
            KEY_SIZE, len
        )));
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&raw);
    raw.zeroize();

    Ok(SymmetricKey::from_bytes(bytes, true))
}
