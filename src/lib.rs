//! pomovault - Pomodoro task list with encryption at rest
//!
//! Tasks, backlog and in-app settings are each stored as one AES-256-GCM
//! encrypted JSON document. The key is either derived from a numeric PIN
//! (PBKDF2-HMAC-SHA256, never stored) or generated at random and kept next
//! to the data ("auto" mode, no PIN).
//!
//! # Architecture
//!
//! - `config`: Path resolution and application settings
//! - `error`: Custom error types
//! - `crypto`: Key derivation, key generation and authenticated encryption
//! - `storage`: String key-value store (files or memory)
//! - `security`: Security mode, session key lifecycle and re-encryption
//! - `stores`: The encrypted task, backlog and settings documents
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pomovault::{config::Settings, security::SessionManager, storage::MemoryStore};
//! use pomovault::stores::{TaskListKind, TaskService};
//!
//! let session = SessionManager::new(Arc::new(MemoryStore::new()), &Settings::default());
//! session.initialize()?;
//! session.setup_pin_mode("1234")?;
//! TaskService::new(&session).add(TaskListKind::Tasks, "write report")?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod security;
pub mod storage;
pub mod stores;

pub use error::{VaultError, VaultResult};
