//! Cryptographic functions for pomovault
//!
//! Stateless primitives: random salts and IVs, PBKDF2 key derivation,
//! key generation/export/import and AES-256-GCM encryption of strings.

pub mod encryption;
pub mod key_derivation;
pub mod keys;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, generate_iv, IV_SIZE};
pub use key_derivation::{derive_key_from_passphrase, generate_salt, KdfParams, SALT_SIZE};
pub use keys::{export_key, generate_key, import_key, SymmetricKey};
pub use secure_memory::SecureString;
