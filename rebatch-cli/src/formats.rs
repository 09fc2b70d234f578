use anyhow::Result;
use rebatch_core::{formats_operation, Config};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::{absolute_path, print_result, resolve_output};

pub fn handle_formats(
    dir: &Path,
    recursive: bool,
    output: Option<OutputFormat>,
    config: &Config,
) -> Result<bool> {
    let output = resolve_output(output, config);
    let root = absolute_path(dir)?;
    let result = formats_operation(&root, recursive || config.defaults.recursive)?;
    print_result(&result, output, false);
    Ok(true)
}
