//! Application settings for pomovault
//!
//! Plaintext preferences that tune the security layer. These are not the
//! user's in-app settings document, which lives encrypted in the store.

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::crypto::key_derivation::{KdfParams, DEFAULT_ITERATIONS};
use crate::error::VaultError;
use crate::storage::file_io::{read_json, write_json_atomic};

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// PBKDF2 iteration count for newly configured PINs
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Number of digits in a PIN
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_pin_length() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            kdf_iterations: default_kdf_iterations(),
            pin_length: default_pin_length(),
        }
    }
}

impl Settings {
    /// Key derivation parameters for new PIN configurations
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::with_iterations(self.kdf_iterations)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), VaultError> {
        self.kdf_params().validate()?;
        if !(4..=12).contains(&self.pin_length) {
            return Err(VaultError::Config(format!(
                "PIN length must be between 4 and 12, got {}",
                self.pin_length
            )));
        }
        Ok(())
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings: Settings = read_json(paths.settings_file())
            .map_err(|e| VaultError::Config(format!("Failed to load settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        self.validate()?;
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
