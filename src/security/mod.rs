//! Security mode and session lifecycle
//!
//! - `config`: the persisted, non-secret security configuration
//! - `session`: setup, unlock, lock, mode change and reset
//! - `migration`: re-encryption of the stores when the key changes

pub mod config;
pub mod migration;
pub mod session;

pub use config::{SecurityConfiguration, SecurityMode};
pub use migration::{MigrationFailure, MigrationReport};
pub use session::{SessionManager, SessionStatus, StartupState, VERIFICATION_SENTINEL};
