//! Security status and migration report formatting

use crate::security::{MigrationReport, SecurityMode, SessionStatus};
use crate::storage::StoreKind;

/// Format the security status with which stores hold data
pub fn format_status(status: &SessionStatus, present: &[(StoreKind, bool)]) -> String {
    let mut output = String::new();
    output.push_str("Security Status\n");
    output.push_str("===============\n\n");

    let (mode, detail) = match status.mode {
        SecurityMode::Pin => ("PIN", "key derived from your PIN, never stored"),
        SecurityMode::Auto => ("AUTO", "random key stored locally"),
        SecurityMode::None => ("NOT CONFIGURED", "run 'pomovault setup auto' or 'pomovault setup pin'"),
    };
    output.push_str(&format!("Mode:    {} ({})\n", mode, detail));

    if status.mode != SecurityMode::None {
        let lock = if status.unlocked { "unlocked" } else { "locked" };
        output.push_str(&format!("Session: {}\n", lock));
    }

    output.push_str("\nStores:\n");
    for (kind, exists) in present {
        let state = if *exists { "encrypted data" } else { "empty" };
        output.push_str(&format!("  {:<10} {}\n", kind.storage_key(), state));
    }

    output
}

/// Format the outcome of a mode change
pub fn format_migration_report(report: &MigrationReport) -> String {
    let mut output = String::new();

    let join = |kinds: &[StoreKind]| {
        kinds
            .iter()
            .map(|k| k.storage_key())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if !report.migrated.is_empty() {
        output.push_str(&format!("Re-encrypted: {}\n", join(&report.migrated)));
    }
    if !report.absent.is_empty() {
        output.push_str(&format!("No data:      {}\n", join(&report.absent)));
    }
    for failure in &report.failed {
        output.push_str(&format!(
            "NOT migrated: {} ({}); this store can no longer be read\n",
            failure.store, failure.reason
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::MigrationFailure;

    #[test]
    fn test_unconfigured_status() {
        let status = SessionStatus {
            mode: SecurityMode::None,
            unlocked: false,
        };
        let output = format_status(&status, &[(StoreKind::Tasks, false)]);
        assert!(output.contains("NOT CONFIGURED"));
        assert!(!output.contains("Session:"));
        assert!(output.contains("tasks"));
    }

    #[test]
    fn test_locked_pin_status() {
        let status = SessionStatus {
            mode: SecurityMode::Pin,
            unlocked: false,
        };
        let output = format_status(&status, &[(StoreKind::Settings, true)]);
        assert!(output.contains("PIN"));
        assert!(output.contains("Session: locked"));
        assert!(output.contains("encrypted data"));
    }

    #[test]
    fn test_migration_report() {
        let report = MigrationReport {
            migrated: vec![StoreKind::Tasks, StoreKind::Backlog],
            failed: vec![MigrationFailure {
                store: StoreKind::Settings,
                reason: "Decryption failed".to_string(),
            }],
            absent: vec![],
        };
        let output = format_migration_report(&report);
        assert!(output.contains("Re-encrypted: tasks, backlog"));
        assert!(output.contains("NOT migrated: settings"));
        assert!(!output.contains("No data"));
    }
}
