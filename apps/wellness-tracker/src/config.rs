//! Configuration for the wellness tracker.

use crate::models::Goals;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "wellness-tracker";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Daily targets.
    #[serde(default)]
    pub goals: Goals,
    /// Autosave settings.
    #[serde(default)]
    pub autosave: AutosaveConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default path.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .map(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    /// Parse TOML, falling back to defaults when it is invalid.
    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    /// Save configuration to default path.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    /// Get configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Get data directory (database and logs).
    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.data_dir().to_path_buf())
    }

    /// Database path, honouring the configured override.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("wellness.db")))
            .unwrap_or_else(|| "wellness.db".into())
    }
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Header date format string.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%A, %B %d, %Y".to_string()
}

/// Autosave settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Save the log form automatically after edits.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Quiet period before an autosave, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    2000
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; defaults to `wellness.db` in the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directives; `RUST_LOG` takes precedence.
    #[serde(default = "default_directives")]
    pub directives: String,
    /// Log file name inside the data directory.
    #[serde(default = "default_log_file")]
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: default_directives(),
            file_name: default_log_file(),
        }
    }
}

fn default_directives() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    format!("{APP_NAME}.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.goals, Goals::default());
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.delay(), Duration::from_secs(2));
        assert_eq!(config.logging.directives, "info");
        assert_eq!(config.logging.file_name, "wellness-tracker.log");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [goals]
            movement_minutes = 45.0

            [autosave]
            debounce_ms = 500

            [storage]
            path = "/tmp/wellness-test.db"
            "#,
        );

        assert_eq!(config.goals.movement_minutes, 45.0);
        assert_eq!(config.goals.sleep_hours, 7.0);
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.delay(), Duration::from_millis(500));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/wellness-test.db"));
        assert_eq!(config.display.date_format, "%A, %B %d, %Y");
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let config = Config::parse("goals = [not toml");
        assert_eq!(config.autosave.debounce_ms, 2000);
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.autosave.enabled = false;
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!Config::parse(&text).autosave.enabled);
    }
}
