use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::retry::RetryPolicy;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// WeatherAPI.com connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url(), timeout_secs: default_timeout_secs() }
    }
}

impl ProviderConfig {
    /// The configured key, treating blank values as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Value of `Access-Control-Allow-Origin`.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Upper bound on a whole forecast request, retries included.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allowed_origin() -> String {
    "*".to_string()
}

pub(crate) const fn default_deadline_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origin: default_allowed_origin(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weatherapi]
/// api_key = "..."
///
/// [retry]
/// max_attempts = 3
///
/// [server]
/// bind_address = "127.0.0.1:8080"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub weatherapi: ProviderConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load config from the platform path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.override_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "tee-time", "forecast-proxy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the stored key with `value` when it is non-blank.
    pub fn override_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.weatherapi.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weatherapi.api_key = Some(api_key.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();

        assert_eq!(cfg.weatherapi.base_url, "https://api.weatherapi.com/v1");
        assert_eq!(cfg.weatherapi.timeout_secs, 10);
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.server.allowed_origin, "*");
        assert_eq!(cfg.server.deadline_secs, 30);
        assert!(cfg.weatherapi.api_key().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [weatherapi]
            api_key = "KEY"

            [retry]
            max_attempts = 5
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.weatherapi.api_key(), Some("KEY"));
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.initial_delay_ms, 1000);
        assert_eq!(cfg.server.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(cfg.weatherapi.api_key().is_none());
    }

    #[test]
    fn env_override_replaces_stored_key_only_when_non_blank() {
        let mut cfg = Config::default();
        cfg.set_api_key("FROM_FILE".into());

        cfg.override_api_key(Some(" ".into()));
        assert_eq!(cfg.weatherapi.api_key(), Some("FROM_FILE"));

        cfg.override_api_key(None);
        assert_eq!(cfg.weatherapi.api_key(), Some("FROM_FILE"));

        cfg.override_api_key(Some("FROM_ENV".into()));
        assert_eq!(cfg.weatherapi.api_key(), Some("FROM_ENV"));
    }

    #[test]
    fn load_from_missing_path_returns_defaults() {
        let path = std::env::temp_dir().join("forecast-proxy-test-missing").join("config.toml");
        let cfg = Config::load_from(&path).expect("missing file is not an error");
        assert!(cfg.weatherapi.api_key.is_none());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let path = std::env::temp_dir()
            .join(format!("forecast-proxy-test-{}", std::process::id()))
            .join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SAVED".into());
        cfg.server.allowed_origin = "https://tee.example".into();
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded.weatherapi.api_key(), Some("SAVED"));
        assert_eq!(loaded.server.allowed_origin, "https://tee.example");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
