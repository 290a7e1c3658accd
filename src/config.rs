//! Configuration persistence for the pasapalabra app.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rosco::RoscoTiming;

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The currently selected theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Current player; unset means guest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// CSV word catalog. The bundled catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Where progress and reports are stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Hex SHA-256 of the ADMIN password. Report review stays locked when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password_hash: Option<String>,

    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            user: None,
            catalog: None,
            data_dir: None,
            admin_password_hash: None,
            timing: TimingConfig::default(),
        }
    }
}

/// Feedback delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub correct_delay_ms: u64,
    pub wrong_delay_ms: u64,
    pub pass_delay_ms: u64,
    pub pass_finish_delay_ms: u64,
    /// Pause before the next flashcard after answering.
    pub card_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            correct_delay_ms: 600,
            wrong_delay_ms: 2000,
            pass_delay_ms: 200,
            pass_finish_delay_ms: 400,
            card_delay_ms: 600,
        }
    }
}

impl TimingConfig {
    pub fn rosco(&self) -> RoscoTiming {
        RoscoTiming {
            correct_delay: Duration::from_millis(self.correct_delay_ms),
            wrong_delay: Duration::from_millis(self.wrong_delay_ms),
            pass_delay: Duration::from_millis(self.pass_delay_ms),
            pass_finish_delay: Duration::from_millis(self.pass_finish_delay_ms),
        }
    }

    pub fn card_delay(&self) -> Duration {
        Duration::from_millis(self.card_delay_ms)
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pasapalabra")
            .join("config.toml")
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.theme, "default");
        assert!(config.user.is_none());
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.timing.rosco(), RoscoTiming::default());
    }

    #[test]
    fn partial_timing_keeps_other_defaults() {
        let config = Config::parse(
            "theme = \"kanagawa-wave\"\nuser = \"ana\"\n\n[timing]\nwrong_delay_ms = 1500\n",
        )
        .unwrap();
        assert_eq!(config.user.as_deref(), Some("ana"));
        assert_eq!(config.timing.wrong_delay_ms, 1500);
        assert_eq!(config.timing.correct_delay_ms, 600);
        assert_eq!(config.timing.card_delay(), Duration::from_millis(600));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config {
            catalog: Some(PathBuf::from("/tmp/palabras.csv")),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::parse(&text).unwrap();
        assert_eq!(back.catalog, config.catalog);
        assert!(back.user.is_none());
    }

    #[test]
    fn save_and_load_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            user: Some("ana".to_string()),
            admin_password_hash: Some("ab12".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let back = Config::load_from(&path).unwrap();
        assert_eq!(back.user.as_deref(), Some("ana"));
        assert_eq!(back.admin_password_hash.as_deref(), Some("ab12"));
        assert!(Config::load_from(&dir.path().join("missing.toml")).unwrap().user.is_none());
    }
}
