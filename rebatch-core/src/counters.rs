use crate::pathgen::PathParts;
use crate::strategy::RenameConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Numbers claimed for one file of a sequential batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberSeed {
    pub prefix: u64,
    pub suffix: u64,
}

impl NumberSeed {
    /// Seed whose prefix and suffix numbers are the same
    pub fn uniform(value: u64) -> Self {
        Self {
            prefix: value,
            suffix: value,
        }
    }
}

/// Running counters of one batch.
///
/// Created fresh for every batch and discarded afterwards. The conflict
/// checker, the preview and the executor all claim through this type, in
/// input order, so they agree on which file gets which number.
#[derive(Debug, Default, Clone)]
pub struct Counters {
    global: u64,
    per_key: HashMap<String, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the numbers for `path` and advance the counters it uses.
    ///
    /// Strategies other than sequential numbering never advance anything.
    pub fn claim(&mut self, path: &Path, config: &RenameConfig) -> NumberSeed {
        let RenameConfig::SequentialBatch(opts) = config else {
            return NumberSeed::default();
        };

        if opts.format_specific_numbering {
            let key = extension_key(path);
            let suffix_key = format!("{}_suffix", key);
            NumberSeed {
                prefix: self.advance(key),
                suffix: self.advance(suffix_key),
            }
        } else {
            let value = self.global;
            self.global += 1;
            NumberSeed::uniform(value)
        }
    }

    /// Seeds for a whole batch, in input order
    pub fn seed_batch(files: &[PathBuf], config: &RenameConfig) -> Vec<NumberSeed> {
        let mut counters = Self::new();
        files
            .iter()
            .map(|file| counters.claim(file, config))
            .collect()
    }

    fn advance(&mut self, key: String) -> u64 {
        let slot = self.per_key.entry(key).or_insert(0);
        let value = *slot;
        *slot += 1;
        value
    }
}

/// Lower-cased, dot-prefixed extension of `path` (empty when there is none)
pub fn extension_key(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    PathParts::split(&lossy).ext.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::BatchOptions;

    fn batch(format_specific: bool) -> RenameConfig {
        RenameConfig::SequentialBatch(BatchOptions {
            prefix_digits: 2,
            format_specific_numbering: format_specific,
            ..BatchOptions::default()
        })
    }

    #[test]
    fn test_global_numbering() {
        let files: Vec<PathBuf> = ["a.jpg", "b.png", "c.jpg"].iter().map(PathBuf::from).collect();
        let seeds = Counters::seed_batch(&files, &batch(false));
        assert_eq!(
            seeds,
            vec![NumberSeed::uniform(0), NumberSeed::uniform(1), NumberSeed::uniform(2)]
        );
    }

    #[test]
    fn test_per_extension_numbering_is_case_insensitive() {
        let files: Vec<PathBuf> = ["a.jpg", "b.png", "c.JPG", "d.png", "e"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let seeds = Counters::seed_batch(&files, &batch(true));
        let prefixes: Vec<u64> = seeds.iter().map(|s| s.prefix).collect();
        assert_eq!(prefixes, vec![0, 0, 1, 1, 0]);
        assert!(seeds.iter().all(|s| s.prefix == s.suffix));
    }

    #[test]
    fn test_claim_tracks_suffix_counter_separately() {
        let mut counters = Counters::new();
        let config = batch(true);
        counters.claim(Path::new("x.TXT"), &config);
        counters.claim(Path::new("y.txt"), &config);
        let third = counters.claim(Path::new("z.txt"), &config);
        assert_eq!((third.prefix, third.suffix), (2, 2));
        let first_md = counters.claim(Path::new("a.md"), &config);
        assert_eq!((first_md.prefix, first_md.suffix), (0, 0));
    }

    #[test]
    fn test_other_strategies_do_not_count() {
        let mut counters = Counters::new();
        let config = RenameConfig::ExtensionChange {
            new_extension: "md".to_string(),
        };
        assert_eq!(counters.claim(Path::new("a.txt"), &config), NumberSeed::default());
        assert_eq!(counters.claim(Path::new("b.txt"), &config), NumberSeed::default());
    }

    #[test]
    fn test_extension_key() {
        assert_eq!(extension_key(Path::new("/x/Photo.JPEG")), ".jpeg");
        assert_eq!(extension_key(Path::new("Makefile")), "");
    }
}
