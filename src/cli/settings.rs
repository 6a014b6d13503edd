//! In-app settings CLI commands

use clap::Subcommand;
use serde_json::Value;

use crate::error::VaultResult;
use crate::security::SessionManager;
use crate::stores::SettingsService;

use super::ensure_unlocked;

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the settings document
    Show,

    /// Replace the settings document with a JSON object
    Replace {
        /// JSON object
        json: String,
    },

    /// Set one field (value parsed as JSON, otherwise taken as a string)
    Set {
        name: String,
        value: String,
    },
}

/// Handle a settings command
pub fn handle_settings_command(
    session: &SessionManager,
    pin: Option<&str>,
    cmd: SettingsCommands,
) -> VaultResult<()> {
    ensure_unlocked(session, pin)?;
    let service = SettingsService::new(session);

    let settings = match cmd {
        SettingsCommands::Show => service.get()?,
        SettingsCommands::Replace { json } => service.replace(&json)?,
        SettingsCommands::Set { name, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            service.set_field(&name, value)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
