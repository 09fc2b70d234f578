//! Filesystem primitives shared by the executor and undo.

use crate::retry::{retry_while_transient, RetryFailure, RetryPolicy};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

/// Message fragments platforms use for files locked by another process
const BUSY_MESSAGES: &[&str] = &[
    "process cannot access the file",
    "file is being used by another process",
    "sharing violation",
    "file is locked",
    "text file busy",
    "resource busy",
];

#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;
#[cfg(windows)]
const ERROR_LOCK_VIOLATION: i32 = 33;

/// Whether `err` means the file is temporarily in use rather than broken
pub fn is_busy_error(err: &io::Error) -> bool {
    if err.raw_os_error().is_some_and(is_busy_code) {
        return true;
    }
    is_busy_message(&err.to_string())
}

fn is_busy_message(message: &str) -> bool {
    let message = message.to_lowercase();
    BUSY_MESSAGES.iter().any(|pattern| message.contains(pattern))
}

#[cfg(windows)]
fn is_busy_code(code: i32) -> bool {
    code == ERROR_SHARING_VIOLATION || code == ERROR_LOCK_VIOLATION
}

#[cfg(unix)]
fn is_busy_code(code: i32) -> bool {
    code == libc::EBUSY || code == libc::ETXTBSY
}

#[cfg(not(any(unix, windows)))]
fn is_busy_code(_code: i32) -> bool {
    false
}

/// Anything at `path`, including a dangling symlink
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// `a` and `b` differ only by letter case
pub fn is_case_variant(a: &Path, b: &Path) -> bool {
    a != b && a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// Whether `target` names `source` itself, exactly or as a case-only variant
pub fn refers_to_source(source: &Path, target: &Path) -> bool {
    if source == target {
        return true;
    }
    if !is_case_variant(source, target) {
        return false;
    }
    same_file(source, target).unwrap_or(true)
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> Option<bool> {
    use std::os::unix::fs::MetadataExt;

    let a = fs::symlink_metadata(a).ok()?;
    let b = fs::symlink_metadata(b).ok()?;
    Some(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(_a: &Path, _b: &Path) -> Option<bool> {
    None
}

/// Renaming `source` to `target` would replace some other file
pub fn target_blocked(source: &Path, target: &Path) -> bool {
    path_exists(target) && !refers_to_source(source, target)
}

/// `desired` with `_n` inserted before the extension
pub fn suffixed_path(desired: &Path, n: u32) -> PathBuf {
    match desired.to_str() {
        Some(s) => {
            let parts = crate::pathgen::PathParts::split(s);
            parts.with_name(&format!("{}_{}", parts.stem, n), parts.ext)
        },
        None => {
            let mut raw: OsString = desired.as_os_str().to_owned();
            raw.push(format!("_{}", n));
            PathBuf::from(raw)
        },
    }
}

/// First of `desired`, `desired_1`, `desired_2`, ... that does not exist
pub fn generate_unique_path(desired: &Path) -> PathBuf {
    if !path_exists(desired) {
        return desired.to_path_buf();
    }
    (1..=u32::MAX)
        .map(|n| suffixed_path(desired, n))
        .find(|candidate| !path_exists(candidate))
        .unwrap_or_else(|| desired.to_path_buf())
}

/// `fs::rename` retried while the file is busy
pub fn rename_with_retry(from: &Path, to: &Path, policy: &RetryPolicy) -> Result<(), RetryFailure> {
    retry_while_transient(policy, is_busy_error, || fs::rename(from, to))
}

/// Case-only rename through a temporary name.
///
/// Case-insensitive filesystems treat `a.txt -> A.txt` as a no-op, so the
/// file goes to a unique temporary name first. If the second step fails the
/// file is moved back to `from` on a best-effort basis.
pub fn two_phase_rename(from: &Path, to: &Path, policy: &RetryPolicy) -> Result<(), RetryFailure> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let temp = generate_unique_path(&temp_candidate(from, nanos));

    rename_with_retry(from, &temp, policy)?;

    if let Err(failure) = rename_with_retry(&temp, to, policy) {
        if let Err(revert) = rename_with_retry(&temp, from, policy) {
            tracing::warn!(
                temp = %temp.display(),
                original = %from.display(),
                error = %revert,
                "could not move file back after failed case-only rename"
            );
        }
        return Err(failure);
    }
    Ok(())
}

fn temp_candidate(from: &Path, nanos: u128) -> PathBuf {
    match from.to_str() {
        Some(s) => {
            let parts = crate::pathgen::PathParts::split(s);
            parts.with_name(&format!("{}.tmp-{}", parts.stem, nanos), parts.ext)
        },
        None => {
            let mut raw: OsString = from.as_os_str().to_owned();
            raw.push(format!(".tmp-{}", nanos));
            PathBuf::from(raw)
        },
    }
}

/// Signature of the rename used by the executor and undo; [`rename_path`] by default
pub type RenameFn = fn(&Path, &Path, &RetryPolicy) -> Result<(), RetryFailure>;

/// Rename `from` to `to`, using the two-phase form for case-only changes
pub fn rename_path(from: &Path, to: &Path, policy: &RetryPolicy) -> Result<(), RetryFailure> {
    if is_case_variant(from, to) {
        two_phase_rename(from, to, policy)
    } else {
        rename_with_retry(from, to, policy)
    }
}

/// Write `contents` to a temporary file next to `path`, then move it over
/// `path`, so readers never see a truncated file.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file().sync_all()?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
