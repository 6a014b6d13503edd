//! Task display formatting
//!
//! Formats task lists for terminal output.

use crate::stores::{Task, TaskListKind};

/// Format a task list as a table
pub fn format_task_list(list: TaskListKind, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return format!("No tasks in {}.", list);
    }

    let title_width = tasks
        .iter()
        .map(|t| t.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<4}  {:<title_width$}  {:>4}  {}\n",
        "ID",
        "Done",
        "Title",
        "Pomo",
        "Created",
        title_width = title_width,
    ));

    output.push_str(&format!(
        "{:-<8}  {:-<4}  {:-<title_width$}  {:->4}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        title_width = title_width,
    ));

    for task in tasks {
        output.push_str(&format!(
            "{:<8}  {:<4}  {:<title_width$}  {:>4}  {}\n",
            task.short_id(),
            if task.completed { "[x]" } else { "[ ]" },
            task.title,
            task.pomodoros,
            task.created_at.format("%Y-%m-%d"),
            title_width = title_width,
        ));
    }

    let done = tasks.iter().filter(|t| t.completed).count();
    output.push_str(&format!("\n{} of {} done\n", done, tasks.len()));

    output
}

/// One-line summary of a task after a change
pub fn format_task_line(task: &Task) -> String {
    format!(
        "{} {} ({} pomodoro{})",
        task.short_id(),
        task.title,
        task.pomodoros,
        if task.pomodoros == 1 { "" } else { "s" }
    )
}
