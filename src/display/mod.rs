//! Display formatting for terminal output

pub mod status;
pub mod task;

pub use status::{format_migration_report, format_status};
pub use task::{format_task_line, format_task_list};
