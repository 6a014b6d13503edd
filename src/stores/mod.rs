//! Encrypted application stores
//!
//! The task list, the backlog and the in-app settings, each kept as one
//! encrypted JSON document.

pub mod document;
pub mod settings;
pub mod task;
pub mod tasks;

pub use document::EncryptedDocument;
pub use settings::SettingsService;
pub use task::{Task, TaskListKind};
pub use tasks::TaskService;
