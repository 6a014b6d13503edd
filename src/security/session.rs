//! Security session manager
//!
//! Owns the answer to "what protects the data" and holds the live key in
//! memory. Consumers ask it for the session key and call the crypto
//! functions themselves; mode changes go through here so every store is
//! re-encrypted before the new key takes over.
//!
//! State transitions hold the transition lock exclusively, so two
//! overlapping mode changes can never capture a stale old key. Consumers
//! read and write the stores through `with_key`, which holds it shared, so
//! no store write can land between staging and promotion.

use std::sync::{Mutex, RwLock, RwLockWriteGuard};

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{info, warn};

use crate::config::Settings;
use crate::crypto::{
    decrypt, derive_key_from_passphrase, encrypt, export_key, generate_key, generate_salt,
    import_key, KdfParams, SymmetricKey,
};
use crate::error::{VaultError, VaultResult};
use crate::storage::{KeyValueStore, SharedStore, StoreKind};

use super::config::{SecurityConfiguration, SecurityMode};
use super::migration::{discard_staged, recover_staged, stage_reencryption, MigrationReport};

/// Known plaintext encrypted under the PIN key to check a PIN on unlock
pub const VERIFICATION_SENTINEL: &str = "pomovault-pin-verification";

/// Where the session stands after `initialize`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    /// Nothing configured yet
    FirstRun,
    /// Auto mode, key loaded
    Unlocked,
    /// PIN mode, waiting for the PIN
    Locked,
    /// The stored auto key was unusable and all data was cleared
    Reset,
}

/// Snapshot of the session for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub mode: SecurityMode,
    pub unlocked: bool,
}

#[derive(Default)]
struct SessionState {
    mode: SecurityMode,
    key: Option<SymmetricKey>,
}

/// Lifecycle of the security mode and the in-memory session key
pub struct SessionManager {
    store: SharedStore,
    kdf: KdfParams,
    pin_length: usize,
    state: RwLock<SessionState>,
    transition: RwLock<()>,
    store_locks: [Mutex<()>; 3],
}

impl SessionManager {
    /// Create a manager over `store`; call `initialize` before use
    pub fn new(store: SharedStore, settings: &Settings) -> Self {
        Self {
            store,
            kdf: settings.kdf_params(),
            pin_length: settings.pin_length,
            state: RwLock::new(SessionState::default()),
            transition: RwLock::new(()),
            store_locks: Default::default(),
        }
    }

    /// The backing store, shared with the encrypted stores
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Required PIN length for new PINs
    pub fn pin_length(&self) -> usize {
        self.pin_length
    }

    /// Write lock shared by every writer of `kind`'s document
    pub fn store_lock(&self, kind: StoreKind) -> &Mutex<()> {
        let index = match kind {
            StoreKind::Tasks => 0,
            StoreKind::Backlog => 1,
            StoreKind::Settings => 2,
        };
        &self.store_locks[index]
    }

    fn begin_transition(&self) -> VaultResult<RwLockWriteGuard<'_, ()>> {
        self.transition
            .write()
            .map_err(|e| VaultError::Storage(format!("Session transition lock poisoned: {}", e)))
    }

    /// Run `f` with the session key while no state transition can start.
    ///
    /// Every read and write of an encrypted store goes through here. `f`
    /// must not call back into the manager's transitions or `with_key`.
    pub fn with_key<R, F>(&self, f: F) -> VaultResult<R>
    where
        F: FnOnce(&SymmetricKey) -> VaultResult<R>,
    {
        let _guard = self
            .transition
            .read()
            .map_err(|e| VaultError::Storage(format!("Session transition lock poisoned: {}", e)))?;
        let key = self.session_key()?;
        f(&key)
    }

    fn set_state(&self, mode: SecurityMode, key: Option<SymmetricKey>) -> VaultResult<()> {
        let mut state = self.state.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire session write lock: {}", e))
        })?;
        state.mode = mode;
        state.key = key;
        Ok(())
    }

    /// Load the persisted configuration and set mode and lock state.
    ///
    /// Auto mode unlocks immediately. An auto key that cannot be imported
    /// is unrecoverable, so everything is cleared and the session starts
    /// over as a first run.
    pub fn initialize(&self) -> VaultResult<StartupState> {
        let _guard = self.begin_transition()?;

        let Some(config) = SecurityConfiguration::load(self.store.as_ref())? else {
            self.set_state(SecurityMode::None, None)?;
            return Ok(StartupState::FirstRun);
        };

        match config.mode {
            SecurityMode::Auto => {
                let exported = config.exported_key.as_deref().unwrap_or_default();
                match import_key(exported) {
                    Ok(key) => {
                        recover_staged(self.store.as_ref(), &key)?;
                        self.set_state(SecurityMode::Auto, Some(key))?;
                        info!("auto mode session unlocked");
                        Ok(StartupState::Unlocked)
                    }
                    Err(e) => {
                        // TODO: ask for confirmation before wiping once the CLI has a recovery prompt
                        warn!(error = %e, "stored auto key is unusable, clearing all data");
                        self.wipe()?;
                        Ok(StartupState::Reset)
                    }
                }
            }
            SecurityMode::Pin => {
                self.set_state(SecurityMode::Pin, None)?;
                Ok(StartupState::Locked)
            }
            SecurityMode::None => {
                self.set_state(SecurityMode::None, None)?;
                Ok(StartupState::FirstRun)
            }
        }
    }

    /// True when no usable configuration is persisted
    pub fn is_first_run(&self) -> VaultResult<bool> {
        Ok(SecurityConfiguration::load(self.store.as_ref())?.is_none())
    }

    /// Current mode as last set by this manager
    pub fn mode(&self) -> SecurityMode {
        self.state.read().map(|s| s.mode).unwrap_or_default()
    }

    /// Mode and lock state
    pub fn status(&self) -> SessionStatus {
        match self.state.read() {
            Ok(state) => SessionStatus {
                mode: state.mode,
                unlocked: state.key.is_some(),
            },
            Err(_) => SessionStatus {
                mode: SecurityMode::None,
                unlocked: false,
            },
        }
    }

    /// Whether encrypted data can be read or written right now
    pub fn has_session_key(&self) -> bool {
        self.state.read().map(|s| s.key.is_some()).unwrap_or(false)
    }

    /// The live key, or `NotUnlocked`
    pub fn session_key(&self) -> VaultResult<SymmetricKey> {
        let state = self.state.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire session read lock: {}", e))
        })?;
        state.key.clone().ok_or(VaultError::NotUnlocked)
    }

    /// Switch to (or first configure) auto mode with a fresh random key
    pub fn setup_auto_mode(&self) -> VaultResult<Option<MigrationReport>> {
        let _guard = self.begin_transition()?;

        let key = generate_key();
        let config = SecurityConfiguration::auto(export_key(&key)?);
        self.install(config, key)
    }

    /// Switch to (or first configure) PIN mode
    pub fn setup_pin_mode(&self, pin: &str) -> VaultResult<Option<MigrationReport>> {
        self.validate_pin(pin)?;
        let _guard = self.begin_transition()?;

        let salt = generate_salt();
        let key = derive_key_from_passphrase(pin, &salt, &self.kdf)?;
        let verification = encrypt(VERIFICATION_SENTINEL, &key)?;
        let config = SecurityConfiguration::pin(STANDARD.encode(salt), verification, &self.kdf);
        self.install(config, key)
    }

    fn validate_pin(&self, pin: &str) -> VaultResult<()> {
        let valid = pin.len() == self.pin_length && pin.bytes().all(|b| b.is_ascii_digit());
        if valid {
            Ok(())
        } else {
            Err(VaultError::Validation(format!(
                "PIN must be exactly {} digits",
                self.pin_length
            )))
        }
    }

    /// Commit `config` with `new_key`, migrating the stores first if a
    /// configuration already exists. Caller holds the transition lock.
    fn install(
        &self,
        config: SecurityConfiguration,
        new_key: SymmetricKey,
    ) -> VaultResult<Option<MigrationReport>> {
        let store = self.store.as_ref();
        let existing = SecurityConfiguration::load(store)?;

        let migration = match existing {
            Some(previous) => {
                let old_key = self.session_key().map_err(|_| {
                    VaultError::Locked(format!(
                        "unlock the current {} mode before changing security mode",
                        previous.mode
                    ))
                })?;
                Some(stage_reencryption(store, &old_key, &new_key)?)
            }
            None => {
                discard_staged(store)?;
                None
            }
        };

        config.save(store)?;
        recover_staged(store, &new_key)?;
        self.set_state(config.mode, Some(new_key))?;

        match &migration {
            Some(report) => info!(
                mode = %config.mode,
                migrated = report.migrated.len(),
                failed = report.failed.len(),
                "security mode changed"
            ),
            None => info!(mode = %config.mode, "security configured"),
        }

        Ok(migration)
    }

    /// Check `pin` against the stored verification ciphertext.
    ///
    /// A wrong PIN returns `Ok(false)` and leaves the session exactly as it
    /// was. There is no attempt limit.
    pub fn unlock_with_pin(&self, pin: &str) -> VaultResult<bool> {
        let _guard = self.begin_transition()?;

        let config =
            SecurityConfiguration::load(self.store.as_ref())?.ok_or(VaultError::NotConfigured)?;
        if config.mode != SecurityMode::Pin {
            return Err(VaultError::Validation(format!(
                "PIN unlock is not available in {} mode",
                config.mode
            )));
        }

        let salt = config
            .salt
            .as_deref()
            .map(|s| STANDARD.decode(s))
            .transpose()
            .map_err(|e| VaultError::Config(format!("Stored salt is corrupt: {}", e)))?
            .ok_or_else(|| VaultError::Config("Stored salt is missing".to_string()))?;
        let verification = config
            .verification_ciphertext
            .as_deref()
            .ok_or_else(|| VaultError::Config("Verification ciphertext is missing".to_string()))?;

        let candidate = derive_key_from_passphrase(pin, &salt, &config.kdf_params())?;

        match decrypt(verification, &candidate) {
            Ok(text) if text == VERIFICATION_SENTINEL => {}
            Ok(_) | Err(VaultError::Decryption) => {
                info!("PIN verification failed");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        recover_staged(self.store.as_ref(), &candidate)?;
        self.set_state(SecurityMode::Pin, Some(candidate))?;
        info!("PIN session unlocked");
        Ok(true)
    }

    /// Drop the key in PIN mode; no-op in auto mode
    pub fn lock(&self) -> VaultResult<()> {
        let _guard = self.begin_transition()?;

        if self.mode() == SecurityMode::Pin {
            self.set_state(SecurityMode::Pin, None)?;
            info!("PIN session locked");
        }
        Ok(())
    }

    /// Delete the configuration and every encrypted store. Irreversible.
    pub fn clear_all_data(&self) -> VaultResult<()> {
        let _guard = self.begin_transition()?;
        self.wipe()
    }

    fn wipe(&self) -> VaultResult<()> {
        let store = self.store.as_ref();
        SecurityConfiguration::delete(store)?;
        for kind in StoreKind::ALL {
            store.remove(kind.storage_key())?;
        }
        discard_staged(store)?;
        self.set_state(SecurityMode::None, None)?;
        warn!("all encrypted data cleared");
        Ok(())
    }
}
