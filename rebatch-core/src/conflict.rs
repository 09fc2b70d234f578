//! Pre-flight collision detection.
//!
//! Runs the path generator over the whole batch with the same counter
//! seeding the executor uses, and reports every file whose target would
//! clash with another target of the batch or with a file already on disk.

use crate::counters::Counters;
use crate::fs_ops;
use crate::pathgen::PathGenerator;
use crate::strategy::RenameConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// Why a file cannot be renamed safely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictKind {
    /// Another file of the batch maps to the same target, ignoring case
    Duplicate { other: PathBuf },
    /// The target already exists on disk and is not the file itself
    Existing,
    /// No target could be computed
    GenerationFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameConflict {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    #[serde(flatten)]
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<RenameConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Original paths involved in any conflict, sorted and de-duplicated
    pub fn conflicting_paths(&self) -> Vec<PathBuf> {
        self.conflicts
            .iter()
            .map(|c| c.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Report every file of `files` that would collide under `config`
pub fn check_conflicts(files: &[PathBuf], config: &RenameConfig) -> ConflictReport {
    let mut report = ConflictReport::default();

    let generator = match PathGenerator::new(config) {
        Ok(generator) => generator,
        Err(e) => {
            let reason = e.to_string();
            report.conflicts = files
                .iter()
                .map(|file| RenameConflict {
                    source: file.clone(),
                    target: None,
                    kind: ConflictKind::GenerationFailed {
                        reason: reason.clone(),
                    },
                })
                .collect();
            return report;
        },
    };

    let seeds = Counters::seed_batch(files, config);
    // lower-cased target -> first source claiming it
    let mut claimed: HashMap<String, (&PathBuf, PathBuf)> = HashMap::new();
    let mut reported: BTreeSet<&PathBuf> = BTreeSet::new();

    for (file, seed) in files.iter().zip(seeds) {
        let target = match generator.generate(file, seed) {
            Ok(target) => target,
            Err(e) => {
                report.conflicts.push(RenameConflict {
                    source: file.clone(),
                    target: None,
                    kind: ConflictKind::GenerationFailed {
                        reason: e.to_string(),
                    },
                });
                continue;
            },
        };

        let key = target.to_string_lossy().to_lowercase();
        if let Some((first, first_target)) = claimed.get(&key) {
            if *first != file {
                if reported.insert(*first) {
                    report.conflicts.push(RenameConflict {
                        source: (*first).clone(),
                        target: Some(first_target.clone()),
                        kind: ConflictKind::Duplicate {
                            other: file.clone(),
                        },
                    });
                }
                reported.insert(file);
                report.conflicts.push(RenameConflict {
                    source: file.clone(),
                    target: Some(target),
                    kind: ConflictKind::Duplicate {
                        other: (*first).clone(),
                    },
                });
                continue;
            }
        }

        if target != *file && fs_ops::target_blocked(file, &target) {
            report.conflicts.push(RenameConflict {
                source: file.clone(),
                target: Some(target.clone()),
                kind: ConflictKind::Existing,
            });
        }
        claimed.entry(key).or_insert((file, target));
    }

    report
}
