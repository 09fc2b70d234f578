use crate::fs_ops::{self, RenameFn};
use crate::oplog::OpLog;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp layout of the audit log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One rename that actually happened on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    /// Path before the rename
    pub original: PathBuf,
    /// Path after the rename
    pub new: PathBuf,
    /// When the rename completed
    pub timestamp: DateTime<Local>,
}

impl RenameRecord {
    pub fn new(original: PathBuf, new: PathBuf) -> Self {
        Self {
            original,
            new,
            timestamp: Local::now(),
        }
    }

    /// `<original> > <new> [<timestamp>]`
    pub fn audit_line(&self) -> String {
        format!(
            "{} > {} [{}]",
            self.original.display(),
            self.new.display(),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Ordered record of completed renames, oldest first.
///
/// Shared by every worker of a batch; [`UndoLog::push`] is the only way
/// records enter and [`UndoLog::undo`] the only way they leave.
#[derive(Debug, Default)]
pub struct UndoLog {
    records: Mutex<Vec<RenameRecord>>,
}

/// A record that could not be reversed
#[derive(Debug, Clone, Serialize)]
pub struct PendingUndo {
    pub record: RenameRecord,
    pub reason: String,
    /// The file was in use; trying again later may succeed
    pub busy: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UndoReport {
    /// Reversed records, newest first
    pub restored: Vec<RenameRecord>,
    /// Records left in the log, newest first
    pub pending: Vec<PendingUndo>,
}

impl UndoReport {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<RenameRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn push(&self, record: RenameRecord) {
        crate::lock(&self.records).push(record);
    }

    pub fn len(&self) -> usize {
        crate::lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the records, oldest first
    pub fn records(&self) -> Vec<RenameRecord> {
        crate::lock(&self.records).clone()
    }

    /// Load a journal written by [`UndoLog::save_to_path`]; a missing file is an empty log
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open undo journal: {}", path.display()))?;
        let records: Vec<RenameRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse undo journal: {}", path.display()))?;
        Ok(Self::from_records(records))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.records())
            .context("Failed to serialize undo journal")?;
        fs_ops::atomic_write(path, &json)
            .with_context(|| format!("Failed to write undo journal: {}", path.display()))
    }

    /// Human-readable audit log, one line per record, oldest first
    pub fn render_audit(&self) -> String {
        crate::lock(&self.records)
            .iter()
            .map(|record| format!("{}\n", record.audit_line()))
            .collect()
    }

    pub fn export_audit(&self, path: &Path) -> Result<()> {
        fs_ops::atomic_write(path, self.render_audit().as_bytes())
            .with_context(|| format!("Failed to write audit log: {}", path.display()))
    }

    /// Reverse every record, newest first
    pub fn undo(&self, policy: &RetryPolicy) -> UndoReport {
        self.undo_logged(policy, &OpLog::disabled())
    }

    /// [`UndoLog::undo`], also writing each step to `log`.
    ///
    /// Records that cannot be reversed stay in the log so a later call can
    /// pick them up again.
    pub fn undo_logged(&self, policy: &RetryPolicy, log: &OpLog) -> UndoReport {
        self.undo_with(policy, log, fs_ops::rename_path)
    }

    /// [`UndoLog::undo_logged`] with a custom rename for each reversal
    pub fn undo_with(&self, policy: &RetryPolicy, log: &OpLog, rename: RenameFn) -> UndoReport {
        let mut records = crate::lock(&self.records);
        let mut report = UndoReport::default();
        let mut kept = Vec::new();

        for record in records.drain(..).rev() {
            match reverse(&record, policy, rename) {
                Ok(()) => {
                    log.log(&format!(
                        "Restored {} -> {}",
                        record.new.display(),
                        record.original.display()
                    ));
                    report.restored.push(record);
                },
                Err((reason, busy)) => {
                    log.log(&format!(
                        "Could not restore {}: {}",
                        record.new.display(),
                        reason
                    ));
                    tracing::warn!(path = %record.new.display(), %reason, "undo left pending");
                    kept.push(record.clone());
                    report.pending.push(PendingUndo {
                        record,
                        reason,
                        busy,
                    });
                },
            }
        }

        kept.reverse();
        *records = kept;
        report
    }
}

fn reverse(
    record: &RenameRecord,
    policy: &RetryPolicy,
    rename: RenameFn,
) -> Result<(), (String, bool)> {
    if !fs_ops::path_exists(&record.new) {
        return Err((
            format!("{} no longer exists", record.new.display()),
            false,
        ));
    }
    if fs_ops::target_blocked(&record.new, &record.original) {
        return Err((
            format!("{} is occupied by another file", record.original.display()),
            false,
        ));
    }

    rename(&record.new, &record.original, policy)
        .map_err(|failure| (failure.to_string(), failure.transient))
}
