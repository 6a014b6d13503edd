//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the session and store layers.

pub mod security;
pub mod settings;
pub mod task;

pub use security::{
    handle_reset_command, handle_setup_command, handle_status_command, handle_unlock_command,
    SetupCommands,
};
pub use settings::{handle_settings_command, SettingsCommands};
pub use task::{handle_task_command, TaskCommands};

use std::sync::Arc;

use tracing::debug;

use crate::config::{paths::VaultPaths, settings::Settings};
use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};
use crate::security::{SecurityMode, SessionManager, StartupState};
use crate::storage::FileStore;

/// Open the file store and initialise a session over it
pub fn open_session(paths: &VaultPaths, settings: &Settings) -> VaultResult<SessionManager> {
    paths.ensure_directories()?;
    let store = FileStore::open(paths.data_dir())?;
    let session = SessionManager::new(Arc::new(store), settings);

    let state = session.initialize()?;
    debug!(?state, "session initialised");
    if state == StartupState::Reset {
        eprintln!("The stored encryption key was unusable. All data has been cleared.");
        eprintln!("Run 'pomovault setup auto' or 'pomovault setup pin' to start again.");
    }

    Ok(session)
}

/// Make sure the session key is available, asking for the PIN if needed
pub fn ensure_unlocked(session: &SessionManager, pin: Option<&str>) -> VaultResult<()> {
    if session.has_session_key() {
        return Ok(());
    }

    match session.mode() {
        SecurityMode::None => Err(VaultError::NotConfigured),
        SecurityMode::Auto => Err(VaultError::NotUnlocked),
        SecurityMode::Pin => {
            let pin = read_pin(pin, "Enter PIN: ")?;
            if session.unlock_with_pin(&pin)? {
                Ok(())
            } else {
                Err(VaultError::Locked("incorrect PIN".to_string()))
            }
        }
    }
}

/// Use the PIN given on the command line, or prompt for it (hidden input)
pub fn read_pin(provided: Option<&str>, prompt: &str) -> VaultResult<SecureString> {
    if let Some(pin) = provided {
        return Ok(SecureString::from(pin));
    }
    rpassword::prompt_password(prompt)
        .map(SecureString::from)
        .map_err(|e| VaultError::Io(format!("Failed to read PIN: {}", e)))
}

/// Prompt for a new PIN with confirmation
pub fn prompt_new_pin(pin_length: usize) -> VaultResult<SecureString> {
    loop {
        let pin1 = read_pin(None, &format!("Enter new {}-digit PIN: ", pin_length))?;

        if !pin1.is_pin_of_length(pin_length) {
            println!("PIN must be exactly {} digits. Please try again.", pin_length);
            continue;
        }

        let pin2 = read_pin(None, "Confirm PIN: ")?;

        if pin1.as_str() != pin2.as_str() {
            println!("PINs do not match. Please try again.");
            continue;
        }

        return Ok(pin1);
    }
}
