use anyhow::{Context, Result};
use clap::Parser;
use rebatch_core::{
    BatchOptions, CancelFlag, Config, EngineError, OutputFormatter, RenameConfig, VersionResult,
};
use std::path::{Path, PathBuf};
use std::process;

mod cli;
mod formats;
mod log;
mod progress;
mod run;
mod undo;

use cli::{Cli, Commands, OutputFormat};

fn main() {
    init_tracing();

    // SIGINT and SIGTERM both stop dispatching; running renames finish.
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing renames in progress...");
        handler_flag.cancel();
    }) {
        tracing::warn!("Could not install the interrupt handler: {e}");
    }

    let cli = Cli::parse();
    let use_color = if cli.no_color { Some(false) } else { None };

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e:#}");
                process::exit(2);
            });
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring config: {e:#}");
        Config::default()
    });
    let error_output = command_output(&cli.command, &config);

    let result = match cli.command {
        Commands::Number {
            prefix_digits,
            prefix,
            suffix,
            suffix_digits,
            drop_original,
            per_format,
            start_from_one,
            batch,
        } => {
            let rename = RenameConfig::SequentialBatch(BatchOptions {
                prefix_digits,
                prefix_text: prefix,
                keep_original: !drop_original,
                suffix_text: suffix,
                suffix_digits,
                format_specific_numbering: per_format,
                start_from_zero: !start_from_one,
            });
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Ext {
            new_extension,
            batch,
        } => {
            let rename = RenameConfig::ExtensionChange { new_extension };
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Case { mode, batch } => {
            let rename = RenameConfig::CaseTransform { mode: mode.into() };
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Insert { at, text, batch } => {
            let rename = RenameConfig::InsertChar { position: at, text };
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Delete { from, count, batch } => {
            let rename = RenameConfig::DeleteChar {
                start: from,
                length: count,
            };
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Replace {
            pattern,
            replacement,
            regex,
            batch,
        } => {
            let rename = RenameConfig::PatternReplace {
                pattern,
                replacement,
                use_regex: regex,
            };
            run::handle_batch(&rename, &batch, &config, cancel, use_color)
        },
        Commands::Undo { output, quiet } => undo::handle_undo(output, quiet, &config),
        Commands::Log {
            export,
            output,
            quiet,
        } => log::handle_log(export.as_deref(), output, quiet, &config),
        Commands::Formats {
            dir,
            recursive,
            output,
        } => formats::handle_formats(&dir, recursive, output, &config),
        Commands::Version { output } => handle_version(output),
    };

    match result {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            if let Some(EngineError::Conflicts(report)) = e.downcast_ref::<EngineError>() {
                print_result(report, error_output, false);
                process::exit(1);
            }
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("REBATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Output format the command asked for, so errors can be reported in it
fn command_output(command: &Commands, config: &Config) -> OutputFormat {
    let requested = match command {
        Commands::Number { batch, .. }
        | Commands::Ext { batch, .. }
        | Commands::Case { batch, .. }
        | Commands::Insert { batch, .. }
        | Commands::Delete { batch, .. }
        | Commands::Replace { batch, .. } => batch.output,
        Commands::Undo { output, .. }
        | Commands::Log { output, .. }
        | Commands::Formats { output, .. } => *output,
        Commands::Version { output } => Some(*output),
    };
    resolve_output(requested, config)
}

/// Flag value, else the configured default, else summary
pub(crate) fn resolve_output(requested: Option<OutputFormat>, config: &Config) -> OutputFormat {
    requested.unwrap_or_else(|| {
        config
            .defaults
            .output_format
            .parse::<rebatch_core::OutputFormat>()
            .map(OutputFormat::from)
            .unwrap_or(OutputFormat::Summary)
    })
}

/// JSON is always printed; summaries are dropped in quiet mode.
pub(crate) fn print_result<T: OutputFormatter>(result: &T, output: OutputFormat, quiet: bool) {
    if quiet && output == OutputFormat::Summary {
        return;
    }
    let formatted = result.format(output.into());
    if formatted.ends_with('\n') {
        print!("{formatted}");
    } else {
        println!("{formatted}");
    }
}

pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(cwd.join(path))
}

fn handle_version(output: OutputFormat) -> Result<bool> {
    let version_result = VersionResult {
        name: "rebatch".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let formatted = match output {
        OutputFormat::Json => version_result.format_json(),
        OutputFormat::Summary => version_result.format_summary(),
    };

    println!("{}", formatted);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_prefers_flag() {
        let mut config = Config::default();
        config.defaults.output_format = "json".to_string();

        assert_eq!(
            resolve_output(Some(OutputFormat::Summary), &config),
            OutputFormat::Summary
        );
        assert_eq!(resolve_output(None, &config), OutputFormat::Json);
    }

    #[test]
    fn test_resolve_output_ignores_unknown_config_value() {
        let mut config = Config::default();
        config.defaults.output_format = "yaml".to_string();
        assert_eq!(resolve_output(None, &config), OutputFormat::Summary);
    }

    #[test]
    fn test_absolute_path_keeps_absolute_input() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_path(&cwd).unwrap(), cwd);
        assert_eq!(absolute_path(Path::new("sub")).unwrap(), cwd.join("sub"));
    }
}
