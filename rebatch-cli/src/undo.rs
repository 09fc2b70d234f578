use anyhow::Result;
use rebatch_core::operations::default_log_file;
use rebatch_core::{undo_operation, Config};

use crate::cli::OutputFormat;
use crate::{print_result, resolve_output};

/// Returns false when some renames could not be reversed.
pub fn handle_undo(output: Option<OutputFormat>, quiet: bool, config: &Config) -> Result<bool> {
    let output = resolve_output(output, config);
    let log_file = default_log_file(None);
    let report = undo_operation(&config.retry.policy(), Some(&log_file), None)?;
    print_result(&report, output, quiet);
    Ok(report.is_complete())
}
