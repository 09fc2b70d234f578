use crate::error::EngineError;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only text log of what a batch or an undo did.
///
/// Lines look like `[2024-06-01 12:00:00] message`. Writing is best effort:
/// a failed write is reported through `tracing` and never fails a rename.
#[derive(Debug, Default)]
pub struct OpLog {
    file: Option<Mutex<File>>,
}

impl OpLog {
    /// Log that drops every message
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn open(path: Option<&Path>) -> Result<Self, EngineError> {
        let Some(path) = path else {
            return Ok(Self::disabled());
        };

        let open = || -> std::io::Result<File> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            OpenOptions::new().create(true).append(true).open(path)
        };

        let file = open().map_err(|source| EngineError::Log {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, message: &str) {
        let Some(file) = &self.file else {
            return;
        };

        let mut file = crate::lock(file);
        let result = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
        .and_then(|()| file.flush());

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write operation log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_log_is_silent() {
        let log = OpLog::open(None).unwrap();
        assert!(log.file.is_none());
        log.log("nothing happens");
    }

    #[test]
    fn test_log_appends_timestamped_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("rename.log");

        let log = OpLog::open(Some(&path)).unwrap();
        log.log("renamed a.txt > b.txt");
        drop(log);
        let log = OpLog::open(Some(&path)).unwrap();
        log.log("second run");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] renamed a.txt > b.txt"));
        assert!(lines[1].ends_with("] second run"));
    }

    #[test]
    fn test_open_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let err = OpLog::open(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, EngineError::Log { .. }));
    }
}
