#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod conflict;
pub mod counters;
pub mod error;
pub mod executor;
pub mod fs_ops;
pub mod oplog;
pub mod operations;
pub mod output;
pub mod pathgen;
pub mod preview;
pub mod retry;
pub mod strategy;
pub mod undo;
pub mod walker;

pub use config::Config;
pub use conflict::{check_conflicts, ConflictKind, ConflictReport, RenameConflict};
pub use counters::{extension_key, Counters, NumberSeed};
pub use error::EngineError;
pub use executor::{
    BatchReport, CancelFlag, ExecuteOptions, Executor, FileOutcome, Outcome, OutcomeCounts,
    MAX_UNIQUE_SUFFIX,
};
pub use fs_ops::{generate_unique_path, is_busy_error, RenameFn};
pub use oplog::OpLog;
pub use operations::{
    formats_operation, log_operation, preview_operation, rename_operation, retry_busy,
    undo_operation, RenameOptions,
};
pub use output::{
    FormatsResult, LogResult, OutputFormat, OutputFormatter, PreviewResult, RenameResult,
    VersionResult,
};
pub use pathgen::{generate_path, GenerateError, PathGenerator, PathParts};
pub use preview::{preview, render_preview, PreviewRow};
pub use retry::{retry_while_transient, RetryFailure, RetryPolicy};
pub use strategy::{BatchOptions, CaseMode, RenameConfig};
pub use undo::{PendingUndo, RenameRecord, UndoLog, UndoReport};
pub use walker::{collect_files, normalize_format, scan_formats, WalkOptions};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if another worker panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
