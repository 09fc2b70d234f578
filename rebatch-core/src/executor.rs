//! Concurrent execution of a rename batch.
//!
//! One dispatching loop walks the input in order, claims each file's
//! numbers and spawns a job per file into a fixed-size rayon pool. Jobs
//! compute the target, reserve a free name, rename with busy-retry and
//! record the result. Per-file failures never abort the batch.

use crate::counters::{Counters, NumberSeed};
use crate::error::EngineError;
use crate::fs_ops::{self, RenameFn};
use crate::oplog::OpLog;
use crate::pathgen::PathGenerator;
use crate::retry::RetryPolicy;
use crate::strategy::RenameConfig;
use crate::undo::{RenameRecord, UndoLog};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Highest `_n` suffix tried before a file is reported as a conflict
pub const MAX_UNIQUE_SUFFIX: u32 = 9999;

/// Cooperative cancellation shared between the caller and the workers
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { to: PathBuf },
    /// The strategy left the name as it was
    Unchanged,
    /// Still in use by another process after every retry
    Busy { message: String },
    LengthError { message: String },
    /// No free target name was found
    Conflict { message: String },
    OtherIo { message: String },
    /// Never started because the batch was cancelled
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success { .. } | Self::Unchanged | Self::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "renamed",
            Self::Unchanged => "unchanged",
            Self::Busy { .. } => "busy",
            Self::LengthError { .. } => "length error",
            Self::Conflict { .. } => "conflict",
            Self::OtherIo { .. } => "error",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Busy { message }
            | Self::LengthError { message }
            | Self::Conflict { message }
            | Self::OtherIo { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub renamed: usize,
    pub unchanged: usize,
    pub busy: usize,
    pub length_error: usize,
    pub conflict: usize,
    pub other_io: usize,
    pub cancelled: usize,
}

impl OutcomeCounts {
    pub fn failed(&self) -> usize {
        self.busy + self.length_error + self.conflict + self.other_io
    }
}

/// Outcomes of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn get(&self, path: &Path) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.path == path)
            .map(|o| &o.outcome)
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for entry in &self.outcomes {
            match entry.outcome {
                Outcome::Success { .. } => counts.renamed += 1,
                Outcome::Unchanged => counts.unchanged += 1,
                Outcome::Busy { .. } => counts.busy += 1,
                Outcome::LengthError { .. } => counts.length_error += 1,
                Outcome::Conflict { .. } => counts.conflict += 1,
                Outcome::OtherIo { .. } => counts.other_io += 1,
                Outcome::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub fn busy_files(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Busy { .. }))
            .map(|o| o.path.clone())
            .collect()
    }

    /// Files worth handing to another run: the busy ones
    pub fn retryable(&self) -> Vec<PathBuf> {
        self.busy_files()
    }

    pub fn failed(&self) -> Vec<&FileOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_failure()).collect()
    }

    pub fn renamed(&self) -> Vec<(&Path, &Path)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                Outcome::Success { to } => Some((o.path.as_path(), to.as_path())),
                _ => None,
            })
            .collect()
    }

    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.outcome == Outcome::Cancelled)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.outcome.is_failure())
    }
}

/// Options for executing a batch
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Worker threads; 0 uses one per CPU
    pub workers: usize,
    pub retry: RetryPolicy,
    pub cancel: CancelFlag,
    /// Operation log to append to
    pub log_file: Option<PathBuf>,
}

pub struct Executor {
    options: ExecuteOptions,
    rename: RenameFn,
}

impl Executor {
    pub fn new(options: ExecuteOptions) -> Self {
        Self {
            options,
            rename: fs_ops::rename_path,
        }
    }

    /// Replace the filesystem rename every job performs
    pub fn with_rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }

    pub fn execute(
        &self,
        files: &[PathBuf],
        config: &RenameConfig,
        undo: &UndoLog,
    ) -> Result<BatchReport, EngineError> {
        self.execute_with_progress(files, config, undo, |_, _| {})
    }

    /// Run the batch, calling `on_progress` once for every file as it finishes
    pub fn execute_with_progress<F>(
        &self,
        files: &[PathBuf],
        config: &RenameConfig,
        undo: &UndoLog,
        on_progress: F,
    ) -> Result<BatchReport, EngineError>
    where
        F: Fn(&Path, &Outcome) + Sync + Send,
    {
        let log = OpLog::open(self.options.log_file.as_deref())?;
        log.log(&format!(
            "Starting {} batch of {} file(s)",
            config.kind_name(),
            files.len()
        ));

        let generator = match PathGenerator::new(config) {
            Ok(generator) => generator,
            Err(e) => {
                let message = e.to_string();
                log.log(&format!("Batch aborted: {}", message));
                let outcomes = files
                    .iter()
                    .map(|file| {
                        let outcome = Outcome::OtherIo {
                            message: message.clone(),
                        };
                        on_progress(file, &outcome);
                        FileOutcome {
                            path: file.clone(),
                            outcome,
                        }
                    })
                    .collect();
                return Ok(BatchReport { outcomes });
            },
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .thread_name(|i| format!("rebatch-worker-{}", i))
            .build()?;

        let ctx = BatchContext {
            generator,
            undo,
            log: &log,
            retry: &self.options.retry,
            cancel: &self.options.cancel,
            rename: self.rename,
            reserved: Mutex::new(HashSet::new()),
        };
        let results: Mutex<Vec<Option<Outcome>>> = Mutex::new(vec![None; files.len()]);

        pool.scope(|scope| {
            let mut counters = Counters::new();
            for (index, file) in files.iter().enumerate() {
                if ctx.cancel.is_cancelled() {
                    tracing::debug!(remaining = files.len() - index, "cancelled, stopping dispatch");
                    break;
                }

                let seed = counters.claim(file, config);
                let ctx = &ctx;
                let results = &results;
                let on_progress = &on_progress;
                scope.spawn(move |_| {
                    let outcome = if ctx.cancel.is_cancelled() {
                        Outcome::Cancelled
                    } else {
                        ctx.rename_one(file, seed)
                    };
                    on_progress(file, &outcome);
                    crate::lock(results)[index] = Some(outcome);
                });
            }
        });

        let results = results
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let outcomes: Vec<FileOutcome> = files
            .iter()
            .zip(results)
            .map(|(file, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    on_progress(file, &Outcome::Cancelled);
                    Outcome::Cancelled
                });
                FileOutcome {
                    path: file.clone(),
                    outcome,
                }
            })
            .collect();

        let report = BatchReport { outcomes };
        let counts = report.counts();
        log.log(&format!(
            "Batch finished: {} renamed, {} unchanged, {} failed, {} cancelled",
            counts.renamed,
            counts.unchanged,
            counts.failed(),
            counts.cancelled
        ));
        Ok(report)
    }
}

/// State shared by the jobs of one `execute` call
struct BatchContext<'a> {
    generator: PathGenerator<'a>,
    undo: &'a UndoLog,
    log: &'a OpLog,
    retry: &'a RetryPolicy,
    cancel: &'a CancelFlag,
    rename: RenameFn,
    /// Lower-cased targets handed out in this batch
    reserved: Mutex<HashSet<String>>,
}

impl BatchContext<'_> {
    fn rename_one(&self, file: &Path, seed: NumberSeed) -> Outcome {
        let desired = match self.generator.generate(file, seed) {
            Ok(target) => target,
            Err(e) => {
                let message = e.to_string();
                self.log.log(&format!("Failed {}: {}", file.display(), message));
                return if e.is_length_error() {
                    Outcome::LengthError { message }
                } else {
                    Outcome::OtherIo { message }
                };
            },
        };

        if desired == file {
            return Outcome::Unchanged;
        }

        let Some(target) = self.reserve(file, &desired) else {
            let message = format!("no free name for {}", desired.display());
            self.log.log(&format!("Failed {}: {}", file.display(), message));
            return Outcome::Conflict { message };
        };
        if target != desired {
            tracing::debug!(
                desired = %desired.display(),
                target = %target.display(),
                "target taken, using suffixed name"
            );
        }

        match (self.rename)(file, &target, self.retry) {
            Ok(()) => {
                self.log
                    .log(&format!("Renamed {} -> {}", file.display(), target.display()));
                self.undo
                    .push(RenameRecord::new(file.to_path_buf(), target.clone()));
                Outcome::Success { to: target }
            },
            Err(failure) => {
                crate::lock(&self.reserved).remove(&reservation_key(&target));
                let message = failure.to_string();
                if failure.transient {
                    self.log.log(&format!("Busy {}: {}", file.display(), message));
                    Outcome::Busy { message }
                } else {
                    self.log.log(&format!("Failed {}: {}", file.display(), message));
                    Outcome::OtherIo { message }
                }
            },
        }
    }

    /// Pick `desired` or the first free `_n` variant of it and reserve it
    fn reserve(&self, source: &Path, desired: &Path) -> Option<PathBuf> {
        let mut reserved = crate::lock(&self.reserved);
        let candidates = std::iter::once(desired.to_path_buf())
            .chain((1..=MAX_UNIQUE_SUFFIX).map(|n| fs_ops::suffixed_path(desired, n)));

        for candidate in candidates {
            let key = reservation_key(&candidate);
            if reserved.contains(&key) || fs_ops::target_blocked(source, &candidate) {
                continue;
            }
            reserved.insert(key);
            return Some(candidate);
        }
        None
    }
}

fn reservation_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
