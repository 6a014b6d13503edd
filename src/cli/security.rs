//! Security CLI commands
//!
//! Status, first-time setup, mode changes, PIN verification and reset.

use clap::Subcommand;

use crate::crypto::SecureString;
use crate::display::{format_migration_report, format_status};
use crate::error::{VaultError, VaultResult};
use crate::security::{SecurityMode, SessionManager};
use crate::storage::{KeyValueStore, StoreKind};

use super::{ensure_unlocked, prompt_new_pin};

/// Security setup commands
#[derive(Subcommand)]
pub enum SetupCommands {
    /// Encrypt with a random key stored on this machine (no PIN)
    Auto,

    /// Encrypt with a key derived from a numeric PIN
    Pin {
        /// The new PIN (prompted for if omitted)
        #[arg(long, env = "POMOVAULT_NEW_PIN", hide_env_values = true)]
        new_pin: Option<String>,
    },
}

/// Show the security status
pub fn handle_status_command(session: &SessionManager) -> VaultResult<()> {
    let store = session.store();
    let mut present = Vec::new();
    for kind in StoreKind::ALL {
        present.push((kind, store.get(kind.storage_key())?.is_some()));
    }

    print!("{}", format_status(&session.status(), &present));
    Ok(())
}

/// Configure security, or change mode if already configured
pub fn handle_setup_command(
    session: &SessionManager,
    current_pin: Option<&str>,
    cmd: SetupCommands,
) -> VaultResult<()> {
    let changing = session.mode() != SecurityMode::None;
    if changing {
        // The current key is needed to re-encrypt existing data
        ensure_unlocked(session, current_pin)?;
    }

    let report = match cmd {
        SetupCommands::Auto => session.setup_auto_mode()?,
        SetupCommands::Pin { new_pin } => {
            let pin = match new_pin {
                Some(pin) => SecureString::from(pin),
                None => {
                    println!("Your PIN cannot be recovered. If you forget it, the only way");
                    println!("back in is 'pomovault reset', which deletes all data.");
                    println!();
                    prompt_new_pin(session.pin_length())?
                }
            };
            session.setup_pin_mode(&pin)?
        }
    };

    match report {
        Some(report) => {
            println!("Security mode changed to {}.", session.mode());
            print!("{}", format_migration_report(&report));
        }
        None => println!("Security configured in {} mode.", session.mode()),
    }

    Ok(())
}

/// Verify the PIN
pub fn handle_unlock_command(session: &SessionManager, pin: Option<&str>) -> VaultResult<()> {
    match session.mode() {
        SecurityMode::Pin => {
            ensure_unlocked(session, pin)?;
            println!("PIN is correct.");
            Ok(())
        }
        SecurityMode::Auto => {
            println!("Auto mode has no PIN; data is always available.");
            Ok(())
        }
        SecurityMode::None => Err(VaultError::NotConfigured),
    }
}

/// Delete all data and configuration
pub fn handle_reset_command(session: &SessionManager, yes: bool) -> VaultResult<()> {
    if !yes {
        println!("This permanently deletes your tasks, backlog, settings and");
        println!("security configuration. It cannot be undone.");
        print!("Type 'yes' to continue: ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut confirm = String::new();
        std::io::stdin().read_line(&mut confirm)?;

        if confirm.trim().to_lowercase() != "yes" {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.clear_all_data()?;
    println!("All data cleared.");
    Ok(())
}
