//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Derives the PIN-mode key from the user's PIN and a random salt. The same
//! PIN and salt always yield the same key, which is how unlock re-derives
//! the key without it ever being stored.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::{VaultError, VaultResult};

use super::keys::{SymmetricKey, KEY_SIZE};

/// Salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count accepted from configuration
pub const MIN_ITERATIONS: u32 = 1_000;

/// Parameters for key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// PBKDF2 iteration count
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Create params with a specific iteration count
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> VaultResult<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(VaultError::Config(format!(
                "KDF iterations must be at least {}, got {}",
                MIN_ITERATIONS, self.iterations
            )));
        }
        Ok(())
    }
}

/// Generate a random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a non-exportable key from a passphrase and salt
pub fn derive_key_from_passphrase(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> VaultResult<SymmetricKey> {
    if salt.is_empty() {
        return Err(VaultError::Encryption("Salt must not be empty".to_string()));
    }
    if params.iterations == 0 {
        return Err(VaultError::Encryption(
            "Iteration count must be positive".to_string(),
        ));
    }

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, params.iterations, &mut key);

    Ok(SymmetricKey::from_bytes(key, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::with_iterations(MIN_ITERATIONS)
    }

    #[test]
    fn test_same_passphrase_same_key() {
        let salt = generate_salt();
        let key1 = derive_key_from_passphrase("1234", &salt, &fast()).unwrap();
        let key2 = derive_key_from_passphrase("1234", &salt, &fast()).unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let salt = generate_salt();
        let key1 = derive_key_from_passphrase("1234", &salt, &fast()).unwrap();
        let key2 = derive_key_from_passphrase("9999", &salt, &fast()).unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key_from_passphrase("1234", &generate_salt(), &fast()).unwrap();
        let key2 = derive_key_from_passphrase("1234", &generate_salt(), &fast()).unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_iterations_change_key() {
        let salt = generate_salt();
        let key1 = derive_key_from_passphrase("1234", &salt, &fast()).unwrap();
        let key2 =
            derive_key_from_passphrase("1234", &salt, &KdfParams::with_iterations(2_000)).unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_derived_key_not_exportable() {
        let key = derive_key_from_passphrase("1234", &generate_salt(), &fast()).unwrap();
        assert!(!key.is_exportable());
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 vector, first 32 bytes
        let key = derive_key_from_passphrase(
            "passwd",
            b"salt",
            &KdfParams::with_iterations(1),
        )
        .unwrap();
        assert_eq!(
            &key.as_bytes()[..8],
            &[0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f]
        );
    }

    #[test]
    fn test_validate_params() {
        assert!(KdfParams::default().validate().is_ok());
        assert!(KdfParams::with_iterations(10).validate().is_err());
    }

    #[test]
    fn test_empty_salt_rejected() {
        assert!(derive_key_from_passphrase("1234", &[], &fast()).is_err());
    }
}
