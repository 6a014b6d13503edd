//! Encrypted in-app settings document
//!
//! The settings blob is opaque to this crate: any JSON object is stored
//! and returned as is.

use serde_json::{Map, Value};

use crate::error::{VaultError, VaultResult};
use crate::security::SessionManager;
use crate::storage::StoreKind;

use super::document::EncryptedDocument;

/// Service for the encrypted settings document
pub struct SettingsService<'a> {
    session: &'a SessionManager,
}

impl<'a> SettingsService<'a> {
    /// Create a new settings service
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    fn document(&self) -> EncryptedDocument<'a, Map<String, Value>> {
        EncryptedDocument::for_session(self.session, StoreKind::Settings)
    }

    /// The whole settings object (empty if none saved)
    pub fn get(&self) -> VaultResult<Map<String, Value>> {
        self.session.with_key(|key| self.document().load(key))
    }

    /// Replace the settings with `json`, which must be a JSON object
    pub fn replace(&self, json: &str) -> VaultResult<Map<String, Value>> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| VaultError::Validation(format!("Settings must be valid JSON: {}", e)))?;
        let Value::Object(object) = value else {
            return Err(VaultError::Validation(
                "Settings must be a JSON object".to_string(),
            ));
        };

        self.session
            .with_key(|key| self.document().save(key, &object))?;
        Ok(object)
    }

    /// Set one top-level field
    pub fn set_field(&self, name: &str, value: Value) -> VaultResult<Map<String, Value>> {
        self.session.with_key(|key| {
            self.document().update(key, |object| {
                object.insert(name.to_string(), value);
                Ok(object.clone())
            })
        })
    }
}
