//! Task service
//!
//! Task list and backlog operations on top of the encrypted documents.
//! Every mutation re-encrypts the whole list under the session key.

use uuid::Uuid;

use crate::error::{VaultError, VaultResult};
use crate::security::SessionManager;

use super::document::EncryptedDocument;
use super::task::{Task, TaskListKind};

/// Shortest id prefix accepted when looking up a task
pub const MIN_ID_PREFIX: usize = 4;

/// Service for the task list and backlog
pub struct TaskService<'a> {
    session: &'a SessionManager,
}

impl<'a> TaskService<'a> {
    /// Create a new task service
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    fn document(&self, list: TaskListKind) -> EncryptedDocument<'a, Vec<Task>> {
        EncryptedDocument::for_session(self.session, list.store_kind())
    }

    /// All tasks in a list, in order
    pub fn list(&self, list: TaskListKind) -> VaultResult<Vec<Task>> {
        self.session.with_key(|key| self.document(list).load(key))
    }

    /// Append a new task
    pub fn add(&self, list: TaskListKind, title: &str) -> VaultResult<Task> {
        let task = Task::new(title);
        task.validate()?;

        self.session.with_key(|key| {
            self.document(list).update(key, |tasks| {
                tasks.push(task.clone());
                Ok(())
            })
        })?;

        Ok(task)
    }

    /// Toggle a task's completed flag
    pub fn toggle_completed(&self, list: TaskListKind, identifier: &str) -> VaultResult<Task> {
        self.session.with_key(|key| {
            self.document(list).update(key, |tasks| {
                let index = find_index(tasks, identifier)?;
                tasks[index].completed = !tasks[index].completed;
                Ok(tasks[index].clone())
            })
        })
    }

    /// Count one finished pomodoro against a task
    pub fn record_pomodoro(&self, list: TaskListKind, identifier: &str) -> VaultResult<Task> {
        self.session.with_key(|key| {
            self.document(list).update(key, |tasks| {
                let index = find_index(tasks, identifier)?;
                tasks[index].pomodoros = tasks[index].pomodoros.saturating_add(1);
                Ok(tasks[index].clone())
            })
        })
    }

    /// Remove a task
    pub fn remove(&self, list: TaskListKind, identifier: &str) -> VaultResult<Task> {
        self.session.with_key(|key| {
            self.document(list).update(key, |tasks| {
                let index = find_index(tasks, identifier)?;
                Ok(tasks.remove(index))
            })
        })
    }

    /// Move a task to the end of the other list
    ///
    /// The task is added to the destination before it is removed from the
    /// source, so an interrupted move duplicates rather than loses it.
    pub fn move_task(&self, from: TaskListKind, identifier: &str) -> VaultResult<Task> {
        self.session.with_key(|key| {
            let source = self.document(from);
            let destination = self.document(from.other());

            let task = {
                let tasks = source.load(key)?;
                let index = find_index(&tasks, identifier)?;
                tasks[index].clone()
            };

            destination.update(key, |tasks| {
                if !tasks.iter().any(|t| t.id == task.id) {
                    tasks.push(task.clone());
                }
                Ok(())
            })?;

            source.update(key, |tasks| {
                tasks.retain(|t| t.id != task.id);
                Ok(())
            })?;

            Ok(task)
        })
    }
}

/// Find a task by full id or unique id prefix
fn find_index(tasks: &[Task], identifier: &str) -> VaultResult<usize> {
    let identifier = identifier.trim().to_lowercase();

    if let Ok(id) = Uuid::parse_str(&identifier) {
        return tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| VaultError::task_not_found(identifier));
    }

    if identifier.len() < MIN_ID_PREFIX {
        return Err(VaultError::Validation(format!(
            "Task id prefix must be at least {} characters",
            MIN_ID_PREFIX
        )));
    }

    let matches: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id.simple().to_string().starts_with(&identifier))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(VaultError::task_not_found(identifier)),
        _ => Err(VaultError::Validation(format!(
            "Task id prefix '{}' is ambiguous",
            identifier
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn unlocked_session() -> (Arc<MemoryStore>, SessionManager) {
        let store = Arc::new(MemoryStore::new());
        let settings = Settings {
            kdf_iterations: 1_000,
            ..Settings::default()
        };
        let session = SessionManager::new(store.clone(), &settings);
        session.initialize().unwrap();
        session.setup_auto_mode().unwrap();
        (store, session)
    }

    #[test]
    fn test_add_and_list() {
        let (store, session) = unlocked_session();
        let service = TaskService::new(&session);

        service.add(TaskListKind::Tasks, "buy milk").unwrap();
        service.add(TaskListKind::Tasks, "write report").unwrap();

        let titles: Vec<_> = service
            .list(TaskListKind::Tasks)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["buy milk", "write report"]);
        assert!(service.list(TaskListKind::Backlog).unwrap().is_empty());

        let raw = store.get("tasks").unwrap().unwrap();
        assert!(!raw.contains("buy milk"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let (_store, session) = unlocked_session();
        let service = TaskService::new(&session);
        assert!(matches!(
            service.add(TaskListKind::Tasks, "  "),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn test_toggle_and_pomodoro_by_prefix() {
        let (_store, session) = unlocked_session();
        let service = TaskService::new(&session);
        let task = service.add(TaskListKind::Tasks, "focus").unwrap();

        let toggled = service
            .toggle_completed(TaskListKind::Tasks, &task.short_id())
            .unwrap();
        assert!(toggled.completed);

        let counted = service
            .record_pomodoro(TaskListKind::Tasks, &task.id.to_string())
            .unwrap();
        assert_eq!(counted.pomodoros, 1);
        assert!(counted.completed);
    }

    #[test]
    fn test_remove_unknown_task() {
        let (_store, session) = unlocked_session();
        let service = TaskService::new(&session);
        service.add(TaskListKind::Tasks, "a").unwrap();

        let err = service
            .remove(TaskListKind::Tasks, &Uuid::new_v4().to_string())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            service.remove(TaskListKind::Tasks, "ab"),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn test_move_between_lists() {
        let (_store, session) = unlocked_session();
        let service = TaskService::new(&session);
        let task = service.add(TaskListKind::Tasks, "later").unwrap();

        service.move_task(TaskListKind::Tasks, &task.short_id()).unwrap();
        assert!(service.list(TaskListKind::Tasks).unwrap().is_empty());
        assert_eq!(service.list(TaskListKind::Backlog).unwrap(), vec![task.clone()]);

        service.move_task(TaskListKind::Backlog, &task.short_id()).unwrap();
        assert_eq!(service.list(TaskListKind::Tasks).unwrap(), vec![task]);
    }

    #[test]
    fn test_locked_session_refuses_access() {
        let (_store, session) = unlocked_session();
        session.setup_pin_mode("1234").unwrap();
        session.lock().unwrap();

        let service = TaskService::new(&session);
        assert!(service.list(TaskListKind::Tasks).unwrap_err().is_not_unlocked());
    }

    #[test]
    fn test_separate_services_do_not_lose_adds() {
        let (_store, session) = unlocked_session();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let session = &session;
                scope.spawn(move || {
                    for j in 0..25 {
                        TaskService::new(session)
                            .add(TaskListKind::Tasks, &format!("task {}-{}", i, j))
                            .unwrap();
                    }
                });
            }
        });

        let tasks = TaskService::new(&session).list(TaskListKind::Tasks).unwrap();
        assert_eq!(tasks.len(), 200);
    }

    #[test]
    fn test_adds_survive_concurrent_mode_changes() {
        for round in 0..10 {
            let (_store, session) = unlocked_session();

            let added = std::thread::scope(|scope| {
                let writer = scope.spawn(|| {
                    let service = TaskService::new(&session);
                    (0..30)
                        .map(|i| service.add(TaskListKind::Tasks, &format!("task {}", i)))
                        .filter(|result| result.is_ok())
                        .count()
                });

                session.setup_pin_mode("2468").unwrap();
                session.setup_auto_mode().unwrap();
                writer.join().unwrap()
            });

            let stored = TaskService::new(&session).list(TaskListKind::Tasks).unwrap();
            assert_eq!(added, 30, "round {}", round);
            assert_eq!(stored.len(), added, "round {}", round);
        }
    }
}
