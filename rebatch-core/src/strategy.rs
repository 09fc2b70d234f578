use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How every file of a batch gets its new name.
///
/// Exactly one strategy is active per batch; each variant carries only the
/// fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenameConfig {
    /// Sequential numbering with optional prefix/suffix text
    SequentialBatch(BatchOptions),
    /// Replace the extension, keep the stem
    ExtensionChange { new_extension: String },
    /// Change the letter case of the stem
    CaseTransform { mode: CaseMode },
    /// Insert text at a code-point offset of the stem
    InsertChar { position: usize, text: String },
    /// Delete a code-point range of the stem
    DeleteChar { start: usize, length: usize },
    /// Literal or regex replacement over the stem
    PatternReplace {
        pattern: String,
        replacement: String,
        #[serde(default)]
        use_regex: bool,
    },
}

/// Options for [`RenameConfig::SequentialBatch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Width of the zero-padded number placed before the name (0 = none)
    pub prefix_digits: usize,
    /// Text placed after the prefix number
    pub prefix_text: String,
    /// Whether the original stem is kept between prefix and suffix
    pub keep_original: bool,
    /// Text placed before the suffix number
    pub suffix_text: String,
    /// Width of the zero-padded number placed after the name (0 = none)
    pub suffix_digits: usize,
    /// Number each extension independently instead of one global sequence
    pub format_specific_numbering: bool,
    /// First file gets 0 instead of 1
    pub start_from_zero: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            prefix_digits: 0,
            prefix_text: String::new(),
            keep_original: true,
            suffix_text: String::new(),
            suffix_digits: 0,
            format_specific_numbering: false,
            start_from_zero: true,
        }
    }
}

/// Letter-case transformation applied by [`RenameConfig::CaseTransform`].
///
/// Unrecognised mode names are kept as [`CaseMode::Unknown`] and leave names
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseMode {
    Upper,
    Lower,
    Title,
    Camel,
    Unknown(String),
}

impl FromStr for CaseMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "title" => Self::Title,
            "camel" => Self::Camel,
            _ => Self::Unknown(s.to_string()),
        })
    }
}

impl From<String> for CaseMode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<CaseMode> for String {
    fn from(mode: CaseMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => f.write_str("upper"),
            Self::Lower => f.write_str("lower"),
            Self::Title => f.write_str("title"),
            Self::Camel => f.write_str("camel"),
            Self::Unknown(other) => f.write_str(other),
        }
    }
}

impl RenameConfig {
    /// Short name of the active strategy, used in logs and reports
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SequentialBatch(_) => "sequential_batch",
            Self::ExtensionChange { .. } => "extension_change",
            Self::CaseTransform { .. } => "case_transform",
            Self::InsertChar { .. } => "insert_char",
            Self::DeleteChar { .. } => "delete_char",
            Self::PatternReplace { .. } => "pattern_replace",
        }
    }

    /// Reject configurations that cannot produce a meaningful name.
    ///
    /// A sequential batch that drops the original name needs at least one
    /// number or piece of text, otherwise every file would collapse onto its
    /// bare extension.
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Self::SequentialBatch(opts) = self {
            if !opts.keep_original
                && opts.prefix_digits == 0
                && opts.suffix_digits == 0
                && opts.prefix_text.is_empty()
                && opts.suffix_text.is_empty()
            {
                return Err(EngineError::InvalidConfig(
                    "sequential batch without the original name needs a prefix or suffix"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_mode_parsing() {
        assert_eq!("upper".parse::<CaseMode>().unwrap(), CaseMode::Upper);
        assert_eq!("Title".parse::<CaseMode>().unwrap(), CaseMode::Title);
        assert_eq!(
            "sentence".parse::<CaseMode>().unwrap(),
            CaseMode::Unknown("sentence".to_string())
        );
    }

    #[test]
    fn test_config_json_shape() {
        let config = RenameConfig::InsertChar {
            position: 2,
            text: "x".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"kind":"insert_char","position":2,"text":"x"}"#);

        let parsed: RenameConfig =
            serde_json::from_str(r#"{"kind":"case_transform","mode":"shout"}"#).unwrap();
        assert_eq!(
            parsed,
            RenameConfig::CaseTransform {
                mode: CaseMode::Unknown("shout".to_string())
            }
        );
    }

    #[test]
    fn test_batch_options_defaults_from_partial_json() {
        let parsed: RenameConfig =
            serde_json::from_str(r#"{"kind":"sequential_batch","prefix_digits":3}"#).unwrap();
        let RenameConfig::SequentialBatch(opts) = parsed else {
            panic!("expected sequential batch");
        };
        assert_eq!(opts.prefix_digits, 3);
        assert!(opts.keep_original);
        assert!(opts.start_from_zero);
    }

    #[test]
    fn test_validate_rejects_empty_batch_name() {
        let config = RenameConfig::SequentialBatch(BatchOptions {
            keep_original: false,
            ..BatchOptions::default()
        });
        assert!(config.validate().is_err());

        let config = RenameConfig::SequentialBatch(BatchOptions {
            keep_original: false,
            prefix_digits: 2,
            ..BatchOptions::default()
        });
        assert!(config.validate().is_ok());
    }
}
