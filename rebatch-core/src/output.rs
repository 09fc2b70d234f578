use crate::conflict::{ConflictKind, ConflictReport};
use crate::executor::{BatchReport, Outcome};
use crate::preview::{render_preview, PreviewRow};
use crate::undo::{RenameRecord, UndoReport};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

/// Result of a rename batch
#[derive(Debug, Serialize)]
pub struct RenameResult {
    pub strategy: String,
    pub report: BatchReport,
    /// Records now held by the undo journal
    pub journal_len: usize,
}

/// Result of a dry run
#[derive(Debug, Serialize)]
pub struct PreviewResult {
    pub strategy: String,
    pub rows: Vec<PreviewRow>,
    /// Color override for the summary table; `None` follows the terminal
    #[serde(skip)]
    pub use_color: Option<bool>,
}

/// Result of the log command
#[derive(Debug, Serialize)]
pub struct LogResult {
    pub records: Vec<RenameRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_to: Option<PathBuf>,
}

/// Result of a format scan
#[derive(Debug, Serialize)]
pub struct FormatsResult {
    pub root: PathBuf,
    pub formats: Vec<String>,
}

/// Result of a version command
#[derive(Debug, Serialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for RenameResult {
    fn format_json(&self) -> String {
        let counts = self.report.counts();
        serde_json::to_string(&json!({
            "success": !self.report.has_failures(),
            "operation": "rename",
            "strategy": self.strategy,
            "summary": counts,
            "retryable": self.report.retryable(),
            "journal_len": self.journal_len,
            "outcomes": self.report.outcomes,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let counts = self.report.counts();
        let mut output = String::new();

        writeln!(output, "✓ Renamed {} file(s)", counts.renamed).unwrap();
        if counts.unchanged > 0 {
            writeln!(output, "  {} file(s) already had the target name", counts.unchanged).unwrap();
        }

        for failed in self.report.failed() {
            writeln!(
                output,
                "✗ {} [{}]: {}",
                failed.path.display(),
                failed.outcome.label(),
                failed.outcome.message().unwrap_or_default()
            )
            .unwrap();
        }

        if counts.busy > 0 {
            writeln!(
                output,
                "{} file(s) were in use; close the programs holding them and run the command again",
                counts.busy
            )
            .unwrap();
        }
        if counts.cancelled > 0 {
            writeln!(output, "Cancelled before {} file(s) were started", counts.cancelled).unwrap();
        }
        if counts.renamed > 0 {
            output.push_str("Undo with: rebatch undo\n");
        }

        output
    }
}

impl OutputFormatter for PreviewResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "preview",
            "strategy": self.strategy,
            "rows": self.rows,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.rows.is_empty() {
            return "No files matched".to_string();
        }
        let mut output = render_preview(&self.rows, self.use_color);
        output.push('\n');
        writeln!(output, "Dry run: {} file(s), nothing renamed", self.rows.len()).unwrap();
        output
    }
}

impl OutputFormatter for ConflictReport {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": false,
            "operation": "check",
            "conflicting_paths": self.conflicting_paths(),
            "conflicts": self.conflicts,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = format!(
            "{} file(s) would collide; nothing was renamed\n",
            self.conflicting_paths().len()
        );

        for conflict in &self.conflicts {
            let target = conflict
                .target
                .as_ref()
                .map(|t| t.display().to_string())
                .unwrap_or_default();
            let line = match &conflict.kind {
                ConflictKind::Duplicate { other } => format!(
                    "{} -> {} (same target as {})",
                    conflict.source.display(),
                    target,
                    other.display()
                ),
                ConflictKind::Existing => format!(
                    "{} -> {} (target already exists)",
                    conflict.source.display(),
                    target
                ),
                ConflictKind::GenerationFailed { reason } => {
                    format!("{}: {}", conflict.source.display(), reason)
                },
            };
            writeln!(output, "  {}", line).unwrap();
        }

        output
    }
}

impl OutputFormatter for UndoReport {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.is_complete(),
            "operation": "undo",
            "summary": {
                "restored": self.restored.len(),
                "pending": self.pending.len(),
            },
            "restored": self.restored,
            "pending": self.pending,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.restored.is_empty() && self.pending.is_empty() {
            return "Nothing to undo".to_string();
        }

        let mut output = String::new();
        if !self.restored.is_empty() {
            writeln!(output, "✓ Restored {} file(s)", self.restored.len()).unwrap();
        }
        for pending in &self.pending {
            writeln!(
                output,
                "✗ {} -> {}: {}",
                pending.record.new.display(),
                pending.record.original.display(),
                pending.reason
            )
            .unwrap();
        }
        if !self.pending.is_empty() {
            writeln!(
                output,
                "{} record(s) kept in the journal; run undo again to retry",
                self.pending.len()
            )
            .unwrap();
        }
        output
    }
}

impl OutputFormatter for LogResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "records": self.records,
            "exported_to": self.exported_to,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.records.is_empty() {
            return "No renames recorded".to_string();
        }

        use comfy_table::{Cell, Color, Table};

        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Original").fg(Color::Cyan),
            Cell::new("New").fg(Color::Cyan),
        ]);

        for record in &self.records {
            table.add_row(vec![
                record.timestamp.format(crate::undo::TIMESTAMP_FORMAT).to_string(),
                record.original.display().to_string(),
                record.new.display().to_string(),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        if let Some(path) = &self.exported_to {
            writeln!(output, "Audit log written to {}", path.display()).unwrap();
        }
        output
    }
}

impl OutputFormatter for FormatsResult {
    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.formats.is_empty() {
            return format!("No file extensions found under {}", self.root.display());
        }
        self.formats.join("\n")
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

impl Outcome {
    /// Single-line description used by progress output
    pub fn describe(&self) -> String {
        match self {
            Self::Success { to } => format!("renamed to {}", to.display()),
            other => match other.message() {
                Some(message) => format!("{}: {}", other.label(), message),
                None => other.label().to_string(),
            },
        }
    }
}
