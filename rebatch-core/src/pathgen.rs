//! Target-path computation for every rename strategy.
//!
//! Everything here is pure: a file path, a [`RenameConfig`] and the
//! [`NumberSeed`] claimed for that file fully determine the result. No
//! filesystem access happens in this module.

use crate::counters::NumberSeed;
use crate::strategy::{BatchOptions, CaseMode, RenameConfig};
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a target path cannot be computed for a file
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("insert position {position} exceeds name length {length} for {name}")]
    InsertOutOfRange {
        name: String,
        position: usize,
        length: usize,
    },

    #[error("delete start position {start} is out of range for name length {length} of {name}")]
    DeleteStartOutOfRange {
        name: String,
        start: usize,
        length: usize,
    },

    #[error("delete length {count} from position {start} exceeds name length {length} of {name}")]
    DeleteLengthOutOfRange {
        name: String,
        start: usize,
        count: usize,
        length: usize,
    },

    #[error("invalid replace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

impl GenerateError {
    /// Position arithmetic fell outside the name; surfaced as a length error.
    pub fn is_length_error(&self) -> bool {
        matches!(
            self,
            Self::InsertOutOfRange { .. }
                | Self::DeleteStartOutOfRange { .. }
                | Self::DeleteLengthOutOfRange { .. }
        )
    }
}

/// A path string split into directory, stem and extension.
///
/// `dir` keeps its trailing separator and `ext` keeps its dot, so
/// `dir + stem + ext` is always the original string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathParts<'a> {
    pub dir: &'a str,
    pub stem: &'a str,
    pub ext: &'a str,
}

impl<'a> PathParts<'a> {
    pub fn split(path: &'a str) -> Self {
        let name_start = path
            .char_indices()
            .filter(|(_, c)| std::path::is_separator(*c))
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        let (dir, name) = path.split_at(name_start);

        // A leading dot marks a hidden file, not an extension.
        match name.rfind('.') {
            Some(dot) if dot > 0 => {
                let (stem, ext) = name.split_at(dot);
                Self { dir, stem, ext }
            },
            _ => Self {
                dir,
                stem: name,
                ext: "",
            },
        }
    }

    /// Split a [`Path`], failing for names that are not valid UTF-8
    pub fn from_path(path: &'a Path) -> Result<Self, GenerateError> {
        path.to_str()
            .map(Self::split)
            .ok_or_else(|| GenerateError::NonUtf8Path(path.to_path_buf()))
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.ext)
    }

    pub fn join(&self) -> String {
        format!("{}{}{}", self.dir, self.stem, self.ext)
    }

    /// Same directory, new stem and extension
    pub fn with_name(&self, stem: &str, ext: &str) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.dir, stem, ext))
    }
}

/// A strategy prepared for one batch.
///
/// Building the generator compiles the regex of a pattern replacement once,
/// so an invalid pattern is reported before any file is looked at.
#[derive(Debug)]
pub struct PathGenerator<'a> {
    config: &'a RenameConfig,
    regex: Option<Regex>,
}

impl<'a> PathGenerator<'a> {
    pub fn new(config: &'a RenameConfig) -> Result<Self, GenerateError> {
        let regex = match config {
            RenameConfig::PatternReplace {
                pattern,
                use_regex: true,
                ..
            } => Some(Regex::new(pattern)?),
            _ => None,
        };
        Ok(Self { config, regex })
    }

    /// Compute the target path of `file`
    pub fn generate(&self, file: &Path, seed: NumberSeed) -> Result<PathBuf, GenerateError> {
        let parts = PathParts::from_path(file)?;

        let (stem, ext): (Cow<'_, str>, Cow<'_, str>) = match self.config {
            RenameConfig::SequentialBatch(opts) => {
                (Cow::Owned(number_stem(parts.stem, opts, seed)), parts.ext.into())
            },
            RenameConfig::ExtensionChange { new_extension } => {
                (parts.stem.into(), Cow::Owned(normalize_extension(new_extension)))
            },
            RenameConfig::CaseTransform { mode } => {
                (Cow::Owned(transform_case(parts.stem, mode)), parts.ext.into())
            },
            RenameConfig::InsertChar { position, text } => (
                Cow::Owned(insert_chars(&parts, *position, text)?),
                parts.ext.into(),
            ),
            RenameConfig::DeleteChar { start, length } => (
                Cow::Owned(delete_chars(&parts, *start, *length)?),
                parts.ext.into(),
            ),
            RenameConfig::PatternReplace {
                pattern,
                replacement,
                ..
            } => {
                let stem = match &self.regex {
                    Some(re) => re.replace_all(parts.stem, replacement.as_str()),
                    None if pattern.is_empty() => Cow::Borrowed(parts.stem),
                    None => Cow::Owned(parts.stem.replace(pattern.as_str(), replacement)),
                };
                (stem, parts.ext.into())
            },
        };

        Ok(parts.with_name(&stem, &ext))
    }
}

/// One-shot form of [`PathGenerator::generate`]
pub fn generate_path(
    file: &Path,
    config: &RenameConfig,
    seed: NumberSeed,
) -> Result<PathBuf, GenerateError> {
    PathGenerator::new(config)?.generate(file, seed)
}

/// Compose `[prefix number][prefix text][stem][suffix text][suffix number]`
fn number_stem(stem: &str, opts: &BatchOptions, seed: NumberSeed) -> String {
    let offset = u64::from(!opts.start_from_zero);
    let mut name = String::new();

    if opts.prefix_digits > 0 {
        name.push_str(&format!(
            "{:0width$}",
            seed.prefix + offset,
            width = opts.prefix_digits
        ));
    }
    name.push_str(&opts.prefix_text);
    if opts.keep_original {
        name.push_str(stem);
    }
    name.push_str(&opts.suffix_text);
    if opts.suffix_digits > 0 {
        name.push_str(&format!(
            "{:0width$}",
            seed.suffix + offset,
            width = opts.suffix_digits
        ));
    }

    if name.is_empty() {
        stem.to_string()
    } else {
        name
    }
}

fn normalize_extension(new_extension: &str) -> String {
    let trimmed = new_extension.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

fn transform_case(stem: &str, mode: &CaseMode) -> String {
    let transformed = match mode {
        CaseMode::Upper => stem.to_uppercase(),
        CaseMode::Lower => stem.to_lowercase(),
        CaseMode::Title => capitalized_words(stem).join(" "),
        CaseMode::Camel => capitalized_words(stem).concat(),
        CaseMode::Unknown(_) => return stem.to_string(),
    };

    if transformed.is_empty() {
        stem.to_string()
    } else {
        transformed
    }
}

fn capitalized_words(stem: &str) -> Vec<String> {
    stem.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect()
            })
        })
        .collect()
}

fn insert_chars(parts: &PathParts<'_>, position: usize, text: &str) -> Result<String, GenerateError> {
    let chars: Vec<char> = parts.stem.chars().collect();
    if position > chars.len() {
        return Err(GenerateError::InsertOutOfRange {
            name: parts.file_name(),
            position,
            length: chars.len(),
        });
    }

    let mut stem: String = chars[..position].iter().collect();
    stem.push_str(text);
    stem.extend(&chars[position..]);
    Ok(stem)
}

fn delete_chars(parts: &PathParts<'_>, start: usize, count: usize) -> Result<String, GenerateError> {
    let chars: Vec<char> = parts.stem.chars().collect();
    if start >= chars.len() {
        return Err(GenerateError::DeleteStartOutOfRange {
            name: parts.file_name(),
            start,
            length: chars.len(),
        });
    }
    if start.saturating_add(count) > chars.len() {
        return Err(GenerateError::DeleteLengthOutOfRange {
            name: parts.file_name(),
            start,
            count,
            length: chars.len(),
        });
    }

    Ok(chars[..start].iter().chain(&chars[start + count..]).collect())
}
