//! Task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{VaultError, VaultResult};
use crate::storage::StoreKind;

/// Longest accepted task title, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Which task list a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskListKind {
    /// Today's tasks
    Tasks,
    /// Tasks parked for later
    Backlog,
}

impl TaskListKind {
    /// The encrypted store backing this list
    pub fn store_kind(self) -> StoreKind {
        match self {
            TaskListKind::Tasks => StoreKind::Tasks,
            TaskListKind::Backlog => StoreKind::Backlog,
        }
    }

    /// The other list
    pub fn other(self) -> Self {
        match self {
            TaskListKind::Tasks => TaskListKind::Backlog,
            TaskListKind::Backlog => TaskListKind::Tasks,
        }
    }
}

impl std::fmt::Display for TaskListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskListKind::Tasks => write!(f, "tasks"),
            TaskListKind::Backlog => write!(f, "backlog"),
        }
    }
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Finished pomodoros spent on this task
    #[serde(default)]
    pub pomodoros: u32,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new open task
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            completed: false,
            pomodoros: 0,
            created_at: Utc::now(),
        }
    }

    /// Short id used in listings
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    /// Validate the task
    pub fn validate(&self) -> VaultResult<()> {
        if self.title.is_empty() {
            return Err(VaultError::Validation("Task title cannot be empty".into()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(VaultError::Validation(format!(
                "Task title cannot exceed {} characters",
                MAX_TITLE_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task() {
        let task = Task::new("  write report ");
        assert_eq!(task.title, "write report");
        assert!(!task.completed);
        assert_eq!(task.pomodoros, 0);
        assert_eq!(task.short_id().len(), 8);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(Task::new("   ").validate().is_err());
        assert!(Task::new("x".repeat(MAX_TITLE_LEN + 1)).validate().is_err());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","title":"a","created_at":"2025-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
        assert_eq!(task.pomodoros, 0);
    }

    #[test]
    fn test_list_kinds() {
        assert_eq!(TaskListKind::Tasks.store_kind(), StoreKind::Tasks);
        assert_eq!(TaskListKind::Backlog.other(), TaskListKind::Tasks);
    }
}
