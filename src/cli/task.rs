//! Task CLI commands

use clap::Subcommand;

use crate::display::{format_task_line, format_task_list};
use crate::error::VaultResult;
use crate::security::SessionManager;
use crate::stores::{TaskListKind, TaskService};

use super::ensure_unlocked;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Use the backlog instead of today's list
        #[arg(short, long)]
        backlog: bool,
    },

    /// Add a task
    Add {
        /// Task title
        title: String,
        #[arg(short, long)]
        backlog: bool,
    },

    /// Toggle a task's completed flag
    Done {
        /// Task id or id prefix
        id: String,
        #[arg(short, long)]
        backlog: bool,
    },

    /// Record a finished pomodoro on a task
    Pomodoro {
        /// Task id or id prefix
        id: String,
        #[arg(short, long)]
        backlog: bool,
    },

    /// Remove a task
    #[command(alias = "rm")]
    Remove {
        /// Task id or id prefix
        id: String,
        #[arg(short, long)]
        backlog: bool,
    },

    /// Move a task between today's list and the backlog
    Move {
        /// Task id or id prefix
        id: String,
        /// Move from the backlog to today's list
        #[arg(short, long)]
        backlog: bool,
    },
}

fn list_kind(backlog: bool) -> TaskListKind {
    if backlog {
        TaskListKind::Backlog
    } else {
        TaskListKind::Tasks
    }
}

/// Handle a task command
pub fn handle_task_command(
    session: &SessionManager,
    pin: Option<&str>,
    cmd: TaskCommands,
) -> VaultResult<()> {
    ensure_unlocked(session, pin)?;
    let service = TaskService::new(session);

    match cmd {
        TaskCommands::List { backlog } => {
            let list = list_kind(backlog);
            print!("{}", format_task_list(list, &service.list(list)?));
        }
        TaskCommands::Add { title, backlog } => {
            let list = list_kind(backlog);
            let task = service.add(list, &title)?;
            println!("Added to {}: {}", list, format_task_line(&task));
        }
        TaskCommands::Done { id, backlog } => {
            let task = service.toggle_completed(list_kind(backlog), &id)?;
            let state = if task.completed { "done" } else { "open" };
            println!("Marked {}: {}", state, format_task_line(&task));
        }
        TaskCommands::Pomodoro { id, backlog } => {
            let task = service.record_pomodoro(list_kind(backlog), &id)?;
            println!("Recorded: {}", format_task_line(&task));
        }
        TaskCommands::Remove { id, backlog } => {
            let task = service.remove(list_kind(backlog), &id)?;
            println!("Removed: {}", format_task_line(&task));
        }
        TaskCommands::Move { id, backlog } => {
            let from = list_kind(backlog);
            let task = service.move_task(from, &id)?;
            println!("Moved to {}: {}", from.other(), format_task_line(&task));
        }
    }

    Ok(())
}
