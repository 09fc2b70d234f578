use crate::conflict::ConflictReport;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a whole batch before or while it starts.
///
/// Per-file failures never show up here; they are recorded as
/// [`crate::Outcome`] values in the batch report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{} file(s) would collide; nothing was renamed", .0.conflicting_paths().len())]
    Conflicts(ConflictReport),

    #[error("invalid rename configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to open operation log {}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
