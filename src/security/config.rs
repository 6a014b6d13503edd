//! Persisted security configuration
//!
//! The non-secret record that says what protects the data and holds just
//! enough to get the key back: a salt plus a verification ciphertext in PIN
//! mode, or the exported key in auto mode.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crypto::key_derivation::{KdfParams, DEFAULT_ITERATIONS};
use crate::error::{VaultError, VaultResult};
use crate::storage::{KeyValueStore, SECURITY_CONFIG_KEY};

/// Which mechanism protects the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    /// Key derived from a user PIN, never persisted
    Pin,
    /// Random key stored alongside the data
    Auto,
    /// Not configured yet
    #[default]
    None,
}

impl std::fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityMode::Pin => write!(f, "pin"),
            SecurityMode::Auto => write!(f, "auto"),
            SecurityMode::None => write!(f, "none"),
        }
    }
}

/// Security configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfiguration {
    pub mode: SecurityMode,

    /// PBKDF2 salt, base64 (PIN mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Sentinel encrypted under the PIN key, base64 (PIN mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_ciphertext: Option<String>,

    /// Exported random key, base64 (auto mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_key: Option<String>,

    /// Iteration count used at setup when it differs from the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf_iterations: Option<u32>,
}

impl SecurityConfiguration {
    /// Build a PIN-mode record
    pub fn pin(salt: String, verification_ciphertext: String, params: &KdfParams) -> Self {
        Self {
            mode: SecurityMode::Pin,
            salt: Some(salt),
            verification_ciphertext: Some(verification_ciphertext),
            exported_key: None,
            kdf_iterations: (params.iterations != DEFAULT_ITERATIONS).then_some(params.iterations),
        }
    }

    /// Build an auto-mode record
    pub fn auto(exported_key: String) -> Self {
        Self {
            mode: SecurityMode::Auto,
            salt: None,
            verification_ciphertext: None,
            exported_key: Some(exported_key),
            kdf_iterations: None,
        }
    }

    /// Key derivation parameters this record was created with
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::with_iterations(self.kdf_iterations.unwrap_or(DEFAULT_ITERATIONS))
    }

    /// Check that exactly the fields for `mode` are present
    pub fn validate(&self) -> VaultResult<()> {
        let pin_fields = self.salt.is_some() && self.verification_ciphertext.is_some();
        let has_any_pin_field = self.salt.is_some() || self.verification_ciphertext.is_some();
        let auto_field = self.exported_key.is_some();

        let consistent = match self.mode {
            SecurityMode::Pin => pin_fields && !auto_field,
            SecurityMode::Auto => auto_field && !has_any_pin_field,
            SecurityMode::None => false,
        };

        if consistent {
            Ok(())
        } else {
            Err(VaultError::Config(format!(
                "Security configuration fields do not match mode '{}'",
                self.mode
            )))
        }
    }

    /// Load the record from the store
    ///
    /// A missing, unparseable or inconsistent record reads as `None`
    /// (first run). Storage failures are still reported.
    pub fn load(store: &dyn KeyValueStore) -> VaultResult<Option<Self>> {
        let Some(raw) = store.get(SECURITY_CONFIG_KEY)? else {
            return Ok(None);
        };

        let config: SecurityConfiguration = match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "ignoring unparseable security configuration");
                return Ok(None);
            }
        };

        if let Err(e) = config.validate() {
            warn!(error = %e, "ignoring inconsistent security configuration");
            return Ok(None);
        }

        Ok(Some(config))
    }

    /// Persist the record, replacing any previous one
    pub fn save(&self, store: &dyn KeyValueStore) -> VaultResult<()> {
        self.validate()?;
        let json = serde_json::to_string(self)?;
        store.set(SECURITY_CONFIG_KEY, &json)
    }

    /// Delete the record
    pub fn delete(store: &dyn KeyValueStore) -> VaultResult<()> {
        store.remove(SECURITY_CONFIG_KEY)
    }
}
