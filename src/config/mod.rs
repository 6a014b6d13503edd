//! Configuration module for pomovault
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Application settings persistence

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::Settings;
