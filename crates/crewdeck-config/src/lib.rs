//! Configuration for the Crewdeck dashboard client.
//!
//! TOML-based configuration with:
//! - Server endpoint for the REST API and the realtime channel
//! - Auth token resolution (env var overrides the config file)
//! - Reconnection policy knobs for the realtime channel
//!
//! Resolution order for the config file: explicit path, then
//! `CREWDECK_CONFIG_DIR`, then the XDG config directory.

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::{ConfigError, Result};

/// Default config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "crewdeck";

/// Environment variable overriding the config directory.
const CONFIG_DIR_ENV: &str = "CREWDECK_CONFIG_DIR";

/// Environment variable overriding the auth token.
const TOKEN_ENV: &str = "CREWDECK_TOKEN";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Realtime channel reconnection policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl ClientConfig {
    /// Validate field values. Runs on every load.
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.reconnect.initial_backoff_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.initial_backoff_ms".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.reconnect.max_backoff_ms < self.reconnect.initial_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.max_backoff_ms".to_string(),
                reason: "must be at least initial_backoff_ms".to_string(),
            });
        }
        Ok(())
    }
}

/// Server endpoint and authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the dashboard API (http/https).
    pub url: String,
    /// Bearer token. The `CREWDECK_TOKEN` env var takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            token: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the auth token: env var first, then config file.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }
}

/// Reconnection policy for the realtime channel.
///
/// The transport retries with exponential backoff between `initial_backoff`
/// and `max_backoff`; `max_attempts = 0` means retry forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// First backoff delay, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Maximum consecutive failed attempts before giving up (0 = unbounded).
    #[serde(default)]
    pub max_attempts: u32,
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_attempts: 0,
        }
    }
}

impl ReconnectConfig {
    /// First backoff delay.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Backoff ceiling.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Backoff for the given attempt number (1-based), doubling per attempt
    /// and capped at `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Whether another attempt is allowed after `attempts` failures.
    pub fn allows_attempt(&self, attempts: u32) -> bool {
        self.max_attempts == 0 || attempts < self.max_attempts
    }
}

/// Platform config directory for Crewdeck, honoring `CREWDECK_CONFIG_DIR`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Default config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Load configuration from the default location.
///
/// A missing file yields the default configuration; a malformed file is an
/// error.
pub fn load_config() -> Result<ClientConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(ClientConfig::default()),
    }
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let config: ClientConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.url, "http://localhost:8080");
        assert_eq!(config.reconnect.max_attempts, 0);
    }

    #[test]
    fn loads_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nurl = \"https://dash.example.com\"\n\n[reconnect]\nmax_attempts = 5"
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.url, "https://dash.example.com");
        assert_eq!(config.reconnect.max_attempts, 5);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.reconnect.initial_backoff_ms, 100);
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nurl = \"\"").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "server.url"
        ));

        std::fs::write(
            &path,
            "[reconnect]\ninitial_backoff_ms = 500\nmax_backoff_ms = 100",
        )
        .unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "reconnect.max_backoff_ms"
        ));
    }

    #[test]
    fn zero_initial_backoff_is_rejected() {
        let config = ClientConfig {
            reconnect: ReconnectConfig {
                initial_backoff_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nurl = 3").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let reconnect = ReconnectConfig::default();
        assert_eq!(reconnect.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(reconnect.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(reconnect.backoff_for_attempt(3), Duration::from_millis(400));
        assert_eq!(reconnect.backoff_for_attempt(30), Duration::from_secs(30));
    }

    #[test]
    fn attempt_budget() {
        let unbounded = ReconnectConfig::default();
        assert!(unbounded.allows_attempt(1_000_000));

        let bounded = ReconnectConfig {
            max_attempts: 3,
            ..Default::default()
        };
        assert!(bounded.allows_attempt(2));
        assert!(!bounded.allows_attempt(3));
    }
}
