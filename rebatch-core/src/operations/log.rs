use super::{state_dir, JOURNAL_FILE};
use crate::output::LogResult;
use crate::undo::UndoLog;
use anyhow::Result;
use std::path::Path;

/// Log operation - the journal of `working_dir`, optionally exported as an audit log
pub fn log_operation(export: Option<&Path>, working_dir: Option<&Path>) -> Result<LogResult> {
    let journal = UndoLog::load_from_path(&state_dir(working_dir).join(JOURNAL_FILE))?;

    if let Some(path) = export {
        journal.export_audit(path)?;
    }

    Ok(LogResult {
        records: journal.records(),
        exported_to: export.map(Path::to_path_buf),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::RenameRecord;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_log_lists_and_exports() {
        let temp_dir = TempDir::new().unwrap();
        let journal = UndoLog::new();
        journal.push(RenameRecord::new(PathBuf::from("a.txt"), PathBuf::from("A.txt")));
        journal
            .save_to_path(&temp_dir.path().join(".rebatch").join(JOURNAL_FILE))
            .unwrap();

        let export = temp_dir.path().join("renames.log");
        let result = log_operation(Some(&export), Some(temp_dir.path())).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.exported_to.as_deref(), Some(export.as_path()));
        assert!(fs::read_to_string(&export).unwrap().starts_with("a.txt > A.txt ["));
    }
}
