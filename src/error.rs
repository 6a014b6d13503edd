//! Custom error types for pomovault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for pomovault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption errors other than a failed decryption
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption failed.
    ///
    /// Covers malformed base64, truncated ciphertext and authentication tag
    /// mismatch alike. A wrong key and tampered data are indistinguishable.
    #[error("Decryption failed: invalid key or corrupted data")]
    Decryption,

    /// A stored key could not be imported
    #[error("Key import failed: {0}")]
    KeyImport(String),

    /// No security configuration exists yet
    #[error("Security is not configured")]
    NotConfigured,

    /// The session key is not available
    #[error("Session is not unlocked")]
    NotUnlocked,

    /// The operation needs the current key but the PIN session is locked
    #[error("Session is locked: {0}")]
    Locked(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl VaultError {
    /// Create a "not found" error for tasks
    pub fn task_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Task",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption)
    }

    /// Check if this error means the session key is unavailable
    pub fn is_not_unlocked(&self) -> bool {
        matches!(self, Self::NotUnlocked)
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for pomovault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = VaultError::task_not_found("1234");
        assert_eq!(err.to_string(), "Task not found: 1234");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decryption_error_is_opaque() {
        let err = VaultError::Decryption;
        assert!(err.is_decryption());
        assert_eq!(
            err.to_string(),
            "Decryption failed: invalid key or corrupted data"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let vault_err: VaultError = json_err.into();
        assert!(matches!(vault_err, VaultError::Json(_)));
    }
}
