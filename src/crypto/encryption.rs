//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption for data at rest using AES-256-GCM.
//! Each encryption operation generates a unique IV. The stored form is a
//! single base64 string of `IV (12 bytes) || ciphertext || tag`.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{VaultError, VaultResult};

use super::keys::SymmetricKey;

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Generate a random IV. Called once per encryption, never reused.
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

fn cipher_for(key: &SymmetricKey) -> VaultResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt raw bytes, returning `IV || ciphertext || tag`
pub fn encrypt_bytes(plaintext: &[u8], key: &SymmetricKey) -> VaultResult<Vec<u8>> {
    let cipher = cipher_for(key)?;

    let iv = generate_iv();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(IV_SIZE + ciphertext.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt `IV || ciphertext || tag` produced by `encrypt_bytes`
pub fn decrypt_bytes(sealed: &[u8], key: &SymmetricKey) -> VaultResult<Vec<u8>> {
    if sealed.len() < IV_SIZE + TAG_SIZE {
        return Err(VaultError::Decryption);
    }

    let cipher = cipher_for(key)?;
    let (iv, ciphertext) = sealed.split_at(IV_SIZE);

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| VaultError::Decryption)
}

/// Encrypt a string into a base64 blob
pub fn encrypt(plaintext: &str, key: &SymmetricKey) -> VaultResult<String> {
    let sealed = encrypt_bytes(plaintext.as_bytes(), key)?;
    Ok(STANDARD.encode(sealed))
}

/// Decrypt a base64 blob into a string
///
/// Bad encoding, truncation, a wrong key and tampering all surface as
/// `VaultError::Decryption`.
pub fn decrypt(ciphertext_b64: &str, key: &SymmetricKey) -> VaultResult<String> {
    let sealed = STANDARD
        .decode(ciphertext_b64.trim())
        .map_err(|_| VaultError::Decryption)?;
    let plaintext = decrypt_bytes(&sealed, key)?;
    String::from_utf8(plaintext).map_err(|_| VaultError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::{derive_key_from_passphrase, generate_salt, KdfParams};
    use crate::crypto::keys::generate_key;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = generate_key();
        let encrypted = encrypt("Hello, World!", &key).unwrap();
        let decrypted = decrypt(&encrypted, &key).unwrap();
        assert_eq!(decrypted, "Hello, World!");
    }

    #[test]
    fn test_blob_layout() {
        let key = generate_key();
        let encrypted = encrypt("abc", &key).unwrap();
        let raw = STANDARD.decode(&encrypted).unwrap();
        assert_eq!(raw.len(), IV_SIZE + 3 + TAG_SIZE);
    }

    #[test]
    fn test_different_ivs() {
        let key = generate_key();
        let encrypted1 = encrypt("Hello, World!", &key).unwrap();
        let encrypted2 = encrypt("Hello, World!", &key).unwrap();

        // Same plaintext should produce different ciphertext (different IVs)
        assert_ne!(encrypted1, encrypted2);
        let raw1 = STANDARD.decode(&encrypted1).unwrap();
        let raw2 = STANDARD.decode(&encrypted2).unwrap();
        assert_ne!(raw1[..IV_SIZE], raw2[..IV_SIZE]);
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = encrypt("Hello, World!", &generate_key()).unwrap();
        let result = decrypt(&encrypted, &generate_key());
        assert!(matches!(result, Err(VaultError::Decryption)));
    }

    #[test]
    fn test_malformed_input_fails_as_decryption() {
        let key = generate_key();
        assert!(matches!(decrypt("%%%not-base64", &key), Err(VaultError::Decryption)));
        assert!(matches!(
            decrypt(&STANDARD.encode([0u8; 8]), &key),
            Err(VaultError::Decryption)
        ));
        assert!(matches!(decrypt("", &key), Err(VaultError::Decryption)));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = generate_key();
        let encrypted = encrypt("", &key).unwrap();
        assert_eq!(decrypt(&encrypted, &key).unwrap(), "");
    }

    #[test]
    fn test_unicode_plaintext() {
        let key = generate_key();
        let plaintext = r#"["café ☕", "日本語", "🍅"]"#;
        let encrypted = encrypt(plaintext, &key).unwrap();
        assert_eq!(decrypt(&encrypted, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_rederived_keys_interchangeable() {
        let salt = generate_salt();
        let params = KdfParams::with_iterations(1_000);
        let key1 = derive_key_from_passphrase("4242", &salt, &params).unwrap();
        let key2 = derive_key_from_passphrase("4242", &salt, &params).unwrap();

        let encrypted = encrypt(r#"{"tasks":[]}"#, &key1).unwrap();
        assert_eq!(decrypt(&encrypted, &key2).unwrap(), r#"{"tasks":[]}"#);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip(plaintext in ".*") {
            let key = generate_key();
            let encrypted = encrypt(&plaintext, &key).unwrap();
            prop_assert_eq!(decrypt(&encrypted, &key).unwrap(), plaintext);
        }

        #[test]
        fn prop_any_flipped_byte_is_rejected(
            plaintext in ".{0,64}",
            index in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let key = generate_key();
            let encrypted = encrypt(&plaintext, &key).unwrap();
            let mut raw = STANDARD.decode(&encrypted).unwrap();
            let i = index.index(raw.len());
            raw[i] ^= mask;

            let tampered = STANDARD.encode(&raw);
            prop_assert!(matches!(decrypt(&tampered, &key), Err(VaultError::Decryption)));
        }
    }
}
