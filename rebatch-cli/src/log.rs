use anyhow::Result;
use rebatch_core::{log_operation, Config};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::{print_result, resolve_output};

pub fn handle_log(
    export: Option<&Path>,
    output: Option<OutputFormat>,
    quiet: bool,
    config: &Config,
) -> Result<bool> {
    let output = resolve_output(output, config);
    let result = log_operation(export, None)?;
    print_result(&result, output, quiet);
    Ok(true)
}
