use super::{state_dir, AUDIT_FILE, JOURNAL_FILE};
use crate::conflict::check_conflicts;
use crate::error::EngineError;
use crate::executor::{BatchReport, ExecuteOptions, Executor, Outcome};
use crate::output::{PreviewResult, RenameResult};
use crate::preview::preview;
use crate::strategy::RenameConfig;
use crate::undo::UndoLog;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Options for running a rename batch from a working directory
#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub execute: ExecuteOptions,
    /// Rewrite `.rebatch/audit.log` after the batch
    pub audit_log: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            execute: ExecuteOptions::default(),
            audit_log: true,
        }
    }
}

/// Dry run: the names a batch would produce, without touching the disk
pub fn preview_operation(files: &[PathBuf], config: &RenameConfig) -> Result<PreviewResult> {
    config.validate()?;
    Ok(PreviewResult {
        strategy: config.kind_name().to_string(),
        rows: preview(files, config),
        use_color: None,
    })
}

/// Rename operation - returns structured data.
///
/// Fails with [`EngineError::Conflicts`] before anything is renamed when the
/// pre-flight check reports anything, including files whose new name cannot
/// be generated. Successful renames are appended to the undo journal of
/// `working_dir`.
pub fn rename_operation<F>(
    files: &[PathBuf],
    config: &RenameConfig,
    options: &RenameOptions,
    working_dir: Option<&Path>,
    on_progress: F,
) -> Result<RenameResult>
where
    F: Fn(&Path, &Outcome) + Sync + Send,
{
    config.validate()?;

    let conflicts = check_conflicts(files, config);
    if !conflicts.is_empty() {
        return Err(EngineError::Conflicts(conflicts).into());
    }

    execute_and_record(files, config, options, working_dir, on_progress)
}

/// Run a batch again over the files that were busy in `previous`.
///
/// Numbering restarts from the first number for the retried subset.
pub fn retry_busy<F>(
    previous: &BatchReport,
    config: &RenameConfig,
    options: &RenameOptions,
    working_dir: Option<&Path>,
    on_progress: F,
) -> Result<RenameResult>
where
    F: Fn(&Path, &Outcome) + Sync + Send,
{
    let files = previous.retryable();
    rename_operation(&files, config, options, working_dir, on_progress)
}

fn execute_and_record<F>(
    files: &[PathBuf],
    config: &RenameConfig,
    options: &RenameOptions,
    working_dir: Option<&Path>,
    on_progress: F,
) -> Result<RenameResult>
where
    F: Fn(&Path, &Outcome) + Sync + Send,
{
    let state_dir = state_dir(working_dir);
    let journal_path = state_dir.join(JOURNAL_FILE);
    let journal = UndoLog::load_from_path(&journal_path)?;

    let report = Executor::new(options.execute.clone())
        .execute_with_progress(files, config, &journal, on_progress)?;

    if report.counts().renamed > 0 {
        journal
            .save_to_path(&journal_path)
            .context("Renames succeeded but the undo journal could not be saved")?;
        if options.audit_log {
            journal.export_audit(&state_dir.join(AUDIT_FILE))?;
        }
    }

    Ok(RenameResult {
        strategy: config.kind_name().to_string(),
        report,
        journal_len: journal.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::strategy::{BatchOptions, CaseMode};
    use std::fs;
    use tempfile::TempDir;

    fn options() -> RenameOptions {
        RenameOptions {
            execute: ExecuteOptions {
                workers: 2,
                retry: RetryPolicy::none(),
                ..ExecuteOptions::default()
            },
            audit_log: true,
        }
    }

    #[test]
    fn test_rename_writes_journal_and_audit() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["a.txt", "b.txt"]
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                fs::write(&path, name).unwrap();
                path
            })
            .collect();
        let config = RenameConfig::SequentialBatch(BatchOptions {
            prefix_digits: 2,
            ..BatchOptions::default()
        });

        let result =
            rename_operation(&files, &config, &options(), Some(temp_dir.path()), |_, _| {})
                .unwrap();

        assert_eq!(result.report.counts().renamed, 2);
        assert_eq!(result.journal_len, 2);
        let state = temp_dir.path().join(".rebatch");
        assert!(state.join(JOURNAL_FILE).exists());
        let audit = fs::read_to_string(state.join(AUDIT_FILE)).unwrap();
        assert_eq!(audit.lines().count(), 2);
    }

    #[test]
    fn test_conflicts_block_the_batch() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["Foo.txt", "foo.TXT"]
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                fs::write(&path, name).unwrap();
                path
            })
            .collect();
        // Skip on case-insensitive filesystems where both names are one file.
        if fs::read_dir(temp_dir.path()).unwrap().count() < 2 {
            return;
        }
        let config = RenameConfig::CaseTransform {
            mode: CaseMode::Upper,
        };

        let err = rename_operation(&files, &config, &options(), Some(temp_dir.path()), |_, _| {})
            .unwrap_err();

        match err.downcast_ref::<EngineError>() {
            Some(EngineError::Conflicts(report)) => assert_eq!(report.conflicting_paths(), files),
            other => panic!("expected conflicts, got {:?}", other),
        }
        assert!(files.iter().all(|f| f.exists()));
        assert!(!temp_dir.path().join(".rebatch").exists());
    }

    #[test]
    fn test_length_error_blocks_the_whole_batch() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["abc.txt", "abcdef.txt"]
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                fs::write(&path, name).unwrap();
                path
            })
            .collect();
        let config = RenameConfig::InsertChar {
            position: 5,
            text: "_".to_string(),
        };

        let err = rename_operation(&files, &config, &options(), Some(temp_dir.path()), |_, _| {})
            .unwrap_err();

        match err.downcast_ref::<EngineError>() {
            Some(EngineError::Conflicts(report)) => {
                assert_eq!(report.conflicting_paths(), vec![files[0].clone()]);
            },
            other => panic!("expected conflicts, got {:?}", other),
        }
        assert!(files.iter().all(|f| f.exists()));
        assert!(!temp_dir.path().join("abcde_f.txt").exists());
        assert!(!temp_dir.path().join(".rebatch").exists());
    }

    #[test]
    fn test_invalid_batch_config_is_rejected() {
        let config = RenameConfig::SequentialBatch(BatchOptions {
            keep_original: false,
            ..BatchOptions::default()
        });

        let err = preview_operation(&[PathBuf::from("a.txt")], &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_retry_busy_with_nothing_busy_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let previous = BatchReport::default();
        let config = RenameConfig::CaseTransform {
            mode: CaseMode::Lower,
        };

        let result =
            retry_busy(&previous, &config, &options(), Some(temp_dir.path()), |_, _| {}).unwrap();
        assert!(result.report.outcomes.is_empty());
    }
}
