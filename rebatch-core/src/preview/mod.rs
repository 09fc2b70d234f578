mod table;

pub use table::render_table;

use crate::counters::Counters;
use crate::pathgen::PathGenerator;
use crate::strategy::RenameConfig;
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Old name and proposed new name of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub from: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
    /// Why no target could be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PreviewRow {
    pub fn is_unchanged(&self) -> bool {
        self.to.as_deref() == Some(self.from.as_path())
    }
}

/// Compute the target of every file without touching the disk.
///
/// Numbering is claimed exactly as the executor claims it, so the preview
/// shows the names a real run would produce (before any `_n` fallback).
pub fn preview(files: &[PathBuf], config: &RenameConfig) -> Vec<PreviewRow> {
    let generator = match PathGenerator::new(config) {
        Ok(generator) => generator,
        Err(e) => {
            let message = e.to_string();
            return files
                .iter()
                .map(|file| PreviewRow {
                    from: file.clone(),
                    to: None,
                    error: Some(message.clone()),
                })
                .collect();
        },
    };

    files
        .iter()
        .zip(Counters::seed_batch(files, config))
        .map(|(file, seed)| match generator.generate(file, seed) {
            Ok(target) => PreviewRow {
                from: file.clone(),
                to: Some(target),
                error: None,
            },
            Err(e) => PreviewRow {
                from: file.clone(),
                to: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// Determine whether to use colors based on explicit preference or terminal detection
pub fn should_use_color_with_detector<F>(use_color: Option<bool>, is_terminal: F) -> bool
where
    F: Fn() -> bool,
{
    match use_color {
        Some(explicit_color) => explicit_color,
        None => is_terminal(),
    }
}

pub fn should_use_color(use_color: Option<bool>) -> bool {
    should_use_color_with_detector(use_color, || io::stdout().is_terminal())
}

/// Render preview rows as a table, colored when stdout is a terminal
pub fn render_preview(rows: &[PreviewRow], use_color: Option<bool>) -> String {
    render_table(rows, should_use_color(use_color))
}

/// Path relative to the current directory when possible
fn display_path(path: &Path) -> String {
    match std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok())
    {
        Some(relative_path) => relative_path.display().to_string(),
        None => path.display().to_string(),
    }
}
