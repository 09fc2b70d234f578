use super::{state_dir, AUDIT_FILE, JOURNAL_FILE};
use crate::oplog::OpLog;
use crate::retry::RetryPolicy;
use crate::undo::{UndoLog, UndoReport};
use anyhow::{Context, Result};
use std::path::Path;

/// High-level undo operation - equivalent to `rebatch undo`.
///
/// Reverses the journal of `working_dir` newest-first and saves whatever
/// could not be reversed back into it.
pub fn undo_operation(
    retry: &RetryPolicy,
    log_file: Option<&Path>,
    working_dir: Option<&Path>,
) -> Result<UndoReport> {
    let state_dir = state_dir(working_dir);
    let journal_path = state_dir.join(JOURNAL_FILE);
    let journal = UndoLog::load_from_path(&journal_path)?;
    if journal.is_empty() {
        return Ok(UndoReport::default());
    }

    let log = OpLog::open(log_file)?;
    log.log(&format!("Undoing {} rename(s)", journal.len()));
    let report = journal.undo_logged(retry, &log);

    journal
        .save_to_path(&journal_path)
        .context("Undo finished but the journal could not be updated")?;
    journal.export_audit(&state_dir.join(AUDIT_FILE))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::RenameRecord;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_undo_empty_journal() {
        let temp_dir = TempDir::new().unwrap();
        let report = undo_operation(&RetryPolicy::none(), None, Some(temp_dir.path())).unwrap();
        assert!(report.restored.is_empty());
        assert!(report.is_complete());
    }

    #[test]
    fn test_undo_restores_and_clears_journal() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.txt");
        let renamed = temp_dir.path().join("00a.txt");
        fs::write(&renamed, "a").unwrap();

        let journal_path = temp_dir.path().join(".rebatch").join(JOURNAL_FILE);
        let journal = UndoLog::new();
        journal.push(RenameRecord::new(original.clone(), renamed.clone()));
        journal.save_to_path(&journal_path).unwrap();

        let report = undo_operation(&RetryPolicy::none(), None, Some(temp_dir.path())).unwrap();

        assert_eq!(report.restored.len(), 1);
        assert!(original.exists());
        assert!(!renamed.exists());
        assert!(UndoLog::load_from_path(&journal_path).unwrap().is_empty());
    }
}
