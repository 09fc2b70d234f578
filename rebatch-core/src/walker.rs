use crate::counters::extension_key;
use crate::fs_ops::is_busy_error;
use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory holding rebatch's own state; never part of a batch
pub const STATE_DIR: &str = ".rebatch";

/// Options for collecting the files of a batch
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Extensions to keep (`jpg`, `.JPG`, ...); empty keeps every file
    pub formats: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl WalkOptions {
    fn normalized_formats(&self) -> BTreeSet<String> {
        self.formats
            .iter()
            .map(|f| normalize_format(f))
            .filter(|f| !f.is_empty())
            .collect()
    }
}

/// Lower-case a format and give it a leading dot
pub fn normalize_format(format: &str) -> String {
    let format = format.trim().to_lowercase();
    if format.is_empty() || format.starts_with('.') {
        format
    } else {
        format!(".{}", format)
    }
}

/// Files under `root` matching `options`, sorted by path.
///
/// Busy entries are skipped; any other walk error is returned.
pub fn collect_files(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let formats = options.normalized_formats();
    let mut files = Vec::new();

    for entry in walk(root, options.recursive)? {
        let Some(entry) = skip_busy(entry)? else {
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if formats.is_empty() || formats.contains(&extension_key(&path)) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Distinct lower-cased extensions of the files under `root`, sorted.
///
/// Each file is opened once; files that are in use are left out.
pub fn scan_formats(root: &Path, recursive: bool) -> Result<Vec<String>> {
    let mut formats = BTreeSet::new();

    for entry in walk(root, recursive)? {
        let Some(entry) = skip_busy(entry)? else {
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match File::open(entry.path()) {
            Ok(_) => {},
            Err(e) if is_busy_error(&e) => {
                tracing::warn!(path = %entry.path().display(), "file busy, skipped");
                continue;
            },
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open {}", entry.path().display()));
            },
        }

        let ext = extension_key(entry.path());
        if !ext.is_empty() {
            formats.insert(ext);
        }
    }

    Ok(formats.into_iter().collect())
}

fn walk(root: &Path, recursive: bool) -> Result<impl Iterator<Item = walkdir::Result<DirEntry>>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    Ok(WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != STATE_DIR))
}

fn skip_busy(entry: walkdir::Result<DirEntry>) -> Result<Option<DirEntry>> {
    match entry {
        Ok(entry) => Ok(Some(entry)),
        Err(e) if e.io_error().is_some_and(is_busy_error) => {
            tracing::warn!(path = ?e.path(), "entry busy, skipped");
            Ok(None)
        },
        Err(e) => Err(e).context("Failed to walk directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join(STATE_DIR)).unwrap();
        for name in ["b.JPG", "a.jpg", "c.png", "README", "sub/d.jpg", ".rebatch/undo.json"] {
            fs::write(root.join(name), name).unwrap();
        }
        temp_dir
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_normalize_format() {
        assert_eq!(normalize_format("JPG"), ".jpg");
        assert_eq!(normalize_format(" .Png "), ".png");
        assert_eq!(normalize_format(""), "");
    }

    #[test]
    fn test_collect_all_top_level_files() {
        let temp_dir = tree();
        let files = collect_files(temp_dir.path(), &WalkOptions::default()).unwrap();
        assert_eq!(
            names(temp_dir.path(), &files),
            vec!["README", "a.jpg", "b.JPG", "c.png"]
        );
    }

    #[test]
    fn test_collect_filtered_recursive() {
        let temp_dir = tree();
        let options = WalkOptions {
            formats: vec!["jpg".to_string()],
            recursive: true,
        };
        let files = collect_files(temp_dir.path(), &options).unwrap();
        assert_eq!(
            names(temp_dir.path(), &files),
            vec!["a.jpg", "b.JPG", "sub/d.jpg"]
        );
    }

    #[test]
    fn test_collect_rejects_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_files(&temp_dir.path().join("missing"), &WalkOptions::default()).is_err());
    }

    #[test]
    fn test_scan_formats() {
        let temp_dir = tree();
        assert_eq!(scan_formats(temp_dir.path(), false).unwrap(), vec![".jpg", ".png"]);
        assert_eq!(scan_formats(temp_dir.path(), true).unwrap(), vec![".jpg", ".png"]);
    }
}
