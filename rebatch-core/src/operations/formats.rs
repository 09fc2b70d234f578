use crate::output::FormatsResult;
use crate::walker::scan_formats;
use anyhow::Result;
use std::path::Path;

/// Formats operation - distinct extensions found under `root`
pub fn formats_operation(root: &Path, recursive: bool) -> Result<FormatsResult> {
    Ok(FormatsResult {
        root: root.to_path_buf(),
        formats: scan_formats(root, recursive)?,
    })
}
