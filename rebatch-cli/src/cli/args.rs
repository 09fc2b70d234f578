use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::types::{CaseArg, OutputFormat};

/// Batch file renaming with conflict checks, busy-file retry and undo
#[derive(Parser, Debug)]
#[command(name = "rebatch")]
#[command(author, version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,
}

/// Arguments shared by every renaming command
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Directory holding the files to rename
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Only rename files with these extensions (comma-separated, e.g. "jpg,png")
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Show the new names without renaming anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of worker threads (default: config value, 0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Run the files that were busy once more after the batch
    #[arg(long)]
    pub retry_busy: bool,

    /// Output format for machine consumption (default: config value)
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Number files sequentially: [prefix number][prefix][name][suffix][suffix number]
    Number {
        /// Width of the zero-padded number before the name (0 = none)
        #[arg(long, default_value_t = 0, value_name = "N")]
        prefix_digits: usize,

        /// Text placed before the name
        #[arg(long, default_value = "", value_name = "TEXT")]
        prefix: String,

        /// Text placed after the name
        #[arg(long, default_value = "", value_name = "TEXT")]
        suffix: String,

        /// Width of the zero-padded number after the name (0 = none)
        #[arg(long, default_value_t = 0, value_name = "N")]
        suffix_digits: usize,

        /// Drop the original name and keep only numbers and text
        #[arg(long)]
        drop_original: bool,

        /// Number every extension separately
        #[arg(long)]
        per_format: bool,

        /// Start counting at 1 instead of 0
        #[arg(long)]
        start_from_one: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Change the extension of every file
    Ext {
        /// New extension, with or without the leading dot ("" removes it)
        new_extension: String,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Change the letter case of file names (extension untouched)
    Case {
        #[arg(value_enum)]
        mode: CaseArg,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Insert text at a character position of each name
    Insert {
        /// Character position, counted from the start of the name
        #[arg(long, value_name = "N")]
        at: usize,

        /// Text to insert
        text: String,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Delete a run of characters from each name
    Delete {
        /// First character to delete
        #[arg(long, value_name = "N")]
        from: usize,

        /// Number of characters to delete
        #[arg(long, value_name = "N")]
        count: usize,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Replace text in each name
    Replace {
        /// Text (or regular expression with --regex) to find
        pattern: String,

        /// Replacement; with --regex, $1 style group references are allowed
        replacement: String,

        /// Treat PATTERN as a regular expression
        #[arg(long)]
        regex: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Undo recorded renames, newest first
    Undo {
        /// Output format for machine consumption
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,

        /// Suppress all output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show recorded renames
    Log {
        /// Write the audit log (`original > new [time]` lines) to this file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,

        /// Output format for machine consumption
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,

        /// Suppress all output
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the file extensions found in a directory
    Formats {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Output format for machine consumption
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Show version information
    Version {
        /// Output format for machine consumption
        #[arg(long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },
}
