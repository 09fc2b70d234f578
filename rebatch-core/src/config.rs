use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Worker threads for a batch (0 = one per CPU)
    #[serde(default)]
    pub workers: usize,

    /// Default output format: "summary" or "json"
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Whether to descend into subdirectories by default
    #[serde(default)]
    pub recursive: bool,

    /// Whether to export the audit log after every batch
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            output_format: default_output_format(),
            recursive: false,
            audit_log: true,
        }
    }
}

/// Busy-file retry schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

fn default_output_format() -> String {
    "summary".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_multiplier() -> u32 {
    2
}

impl Config {
    /// Load config from .rebatch/config.toml if it exists
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".rebatch").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.workers, 0);
        assert_eq!(config.defaults.output_format, "summary");
        assert!(!config.defaults.recursive);
        assert!(config.defaults.audit_log);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_load_save_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.workers = 4;
        config.defaults.output_format = "json".to_string();
        config.retry.max_attempts = 5;

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.defaults.workers, 4);
        assert_eq!(loaded.defaults.output_format, "json");
        assert_eq!(loaded.retry.max_attempts, 5);
        assert_eq!(loaded.retry.base_delay_ms, 500);
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
recursive = true

[retry]
base_delay_ms = 100
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.defaults.recursive);
        assert_eq!(config.defaults.output_format, "summary");

        let policy = config.retry.policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(100));
        assert_eq!(policy.multiplier, 2);
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[defaults\nworkers = ").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
