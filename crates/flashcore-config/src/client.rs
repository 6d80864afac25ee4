use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "client.toml";

/// Timings and policies of the client layer. Not persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Quiet period before a typed query is dispatched.
    pub debounce_ms: u64,
    /// How long the completion indicator stays up before the tracker
    /// returns to idle.
    pub progress_reset_ms: u64,
    /// Local retention of recent searches, mirrors the backend's.
    pub recent_limit: usize,
    /// Revert optimistic pin/recent mutations when the backend call fails.
    pub rollback_on_failure: bool,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            progress_reset_ms: 5_000,
            recent_limit: 10,
            rollback_on_failure: true,
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing client config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl ClientConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn progress_reset(&self) -> Duration {
        Duration::from_millis(self.progress_reset_ms)
    }

    /// Platform config file if present, then `FLASH_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("FLASH_DEBOUNCE_MS") {
            self.debounce_ms = parse_number("FLASH_DEBOUNCE_MS", &value)?;
        }
        if let Some(value) = lookup("FLASH_PROGRESS_RESET_MS") {
            self.progress_reset_ms = parse_number("FLASH_PROGRESS_RESET_MS", &value)?;
        }
        if let Some(value) = lookup("FLASH_RECENT_LIMIT") {
            self.recent_limit = parse_number("FLASH_RECENT_LIMIT", &value)? as usize;
        }
        if let Some(value) = lookup("FLASH_ROLLBACK") {
            self.rollback_on_failure = value.eq_ignore_ascii_case("true") || value == "1";
        }
        if let Some(value) = lookup("FLASH_LOG") {
            self.log_filter = value;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "recent_limit",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "flash-search", "flash-search")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_timings() {
        let config = ClientConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.progress_reset(), Duration::from_secs(5));
        assert_eq!(config.recent_limit, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ClientConfig::from_toml_str("debounce_ms = 120\n").unwrap();
        assert_eq!(config.debounce_ms, 120);
        assert_eq!(config.progress_reset_ms, 5_000);
        assert!(config.rollback_on_failure);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ClientConfig::from_toml_str("debounce = 120\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "recent_limit = 3\nrollback_on_failure = false\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.recent_limit, 3);
        assert!(!config.rollback_on_failure);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn environment_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("FLASH_DEBOUNCE_MS", "50"),
            ("FLASH_ROLLBACK", "0"),
            ("FLASH_LOG", "flashd=debug"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert!(!config.rollback_on_failure);
        assert_eq!(config.log_filter, "flashd=debug");
    }

    #[test]
    fn bad_override_is_reported() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_overrides(|key| (key == "FLASH_RECENT_LIMIT").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FLASH_RECENT_LIMIT", .. }));
    }
}
