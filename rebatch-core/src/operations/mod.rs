//! High-level operations that correspond to CLI commands
//!
//! These modules hold the flow of each rebatch command (walk, check,
//! execute, persist), separated from CLI concerns like argument parsing,
//! progress display and output formatting.

pub mod formats;
pub mod log;
pub mod rename;
pub mod undo;

pub use formats::formats_operation;
pub use log::log_operation;
pub use rename::{preview_operation, rename_operation, retry_busy, RenameOptions};
pub use undo::undo_operation;

use std::path::{Path, PathBuf};

/// Undo journal inside the state directory
pub const JOURNAL_FILE: &str = "undo.json";
/// Human-readable audit log inside the state directory
pub const AUDIT_FILE: &str = "audit.log";

/// `.rebatch` under `working_dir` (or the current directory)
pub fn state_dir(working_dir: Option<&Path>) -> PathBuf {
    working_dir
        .unwrap_or_else(|| Path::new("."))
        .join(crate::walker::STATE_DIR)
}

/// Default operation log of a working directory
pub fn default_log_file(working_dir: Option<&Path>) -> PathBuf {
    state_dir(working_dir).join("logs").join("rename.log")
}
