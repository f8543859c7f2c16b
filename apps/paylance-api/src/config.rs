//! # Application Configuration
//!
//! Settings for the API server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PAYLANCE_BIND_ADDR=0.0.0.0:8080                                    │
//! │     PAYLANCE_LLM_API_KEY=sk-...                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $PAYLANCE_CONFIG, or                                               │
//! │     ~/.config/paylance/paylance.toml (Linux)                           │
//! │     ~/Library/Application Support/com.paylance.paylance/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     127.0.0.1:3000, platform data dir, 1s auto-save                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # paylance.toml
//! bind_addr = "127.0.0.1:3000"
//! db_path = "/var/lib/paylance/paylance.db"
//! autosave_ms = 1000
//!
//! [llm]
//! api_key = "sk-ant-..."
//! model = "claude-3-5-sonnet-20241022"
//! max_tokens = 4096
//! timeout_secs = 60
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// LLM Settings
// =============================================================================

/// Language model connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key. Extraction is unavailable without one.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout() -> u64 {
    60
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

// The key never reaches the logs.
impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Database file. Defaults to the platform data directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Quiet period after the last edit before the draft is written.
    #[serde(default = "default_autosave_ms")]
    pub autosave_ms: u64,

    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_autosave_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: default_bind_addr(),
            db_path: None,
            autosave_ms: default_autosave_ms(),
            llm: LlmSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`PAYLANCE_CONFIG` or the platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("PAYLANCE_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.bind_addr.parse::<SocketAddr>().map_err(|_| {
            ConfigError::Invalid(format!(
                "bind_addr must be host:port, got: {}",
                self.bind_addr
            ))
        })?;

        if self.autosave_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave_ms must be greater than 0".into(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_tokens must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Auto-save delay as a `Duration`.
    pub fn autosave_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_ms)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("PAYLANCE_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.bind_addr = addr;
        }

        if let Some(path) = var("PAYLANCE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(key) = var("PAYLANCE_LLM_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }

        if let Some(model) = var("PAYLANCE_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(ms) = var("PAYLANCE_AUTOSAVE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.autosave_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring non-numeric PAYLANCE_AUTOSAVE_MS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "paylance", "paylance")
            .map(|dirs| dirs.config_dir().join("paylance.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.autosave_ms, 1000);
        assert!(config.llm.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            autosave_ms = 250

            [llm]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.autosave_ms, 250);
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PAYLANCE_BIND_ADDR", "0.0.0.0:8080"),
            ("PAYLANCE_DB_PATH", "/tmp/p.db"),
            ("PAYLANCE_LLM_API_KEY", "sk-env"),
            ("PAYLANCE_AUTOSAVE_MS", "soon"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/p.db")));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        // Unparseable value leaves the default
        assert_eq!(config.autosave_ms, 1000);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.bind_addr = "localhost".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.autosave_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let mut settings = LlmSettings::default();
        settings.api_key = Some("sk-secret".into());
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
