//! Configuration management for the DingTalk notifier
//!
//! This module defines the `AppConfig` struct and its sub-structs. It uses the
//! `figment` crate to load configuration from a `dingtalk.toml` file and merge
//! it with environment variables and command-line overrides.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;

/// The configuration file read when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "dingtalk.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// The logging level for the application.
    pub log_level: String,
    /// Settings for the outbound HTTP client.
    #[serde(default)]
    pub http: HttpConfig,
    /// Settings for the DingTalk robot.
    pub dingtalk: DingtalkConfig,
}

/// Settings for the outbound HTTP client.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct HttpConfig {
    /// Per-request timeout. When unset the client never times out a request.
    pub timeout_seconds: Option<u64>,
}

/// Settings for the DingTalk robot.
///
/// A value of this type is always replaced as a whole; see
/// [`ConfigStore`](crate::notification::store::ConfigStore).
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DingtalkConfig {
    /// Whether alerts should be delivered to DingTalk at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// The robot's access token, sent as the `access_token` query parameter.
    #[serde(default)]
    pub access_token: String,
}

fn default_enabled() -> bool {
    true
}

/// Raised when a configuration fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid dingtalk config: {0}")]
    InvalidConfig(&'static str),
}

impl DingtalkConfig {
    /// Creates an enabled configuration with the given token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            enabled: true,
            access_token: access_token.into(),
        }
    }

    /// Checks that an enabled configuration carries a token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.access_token.is_empty() {
            return Err(ConfigError::InvalidConfig("must specify token"));
        }
        Ok(())
    }
}

impl Default for DingtalkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token: String::new(),
        }
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for DingtalkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.access_token.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("DingtalkConfig")
            .field("enabled", &self.enabled)
            .field("access_token", &token)
            .finish()
    }
}

impl AppConfig {
    /// Loads the application configuration by layering defaults, the TOML
    /// file, environment variables and command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
        let config: AppConfig = Self::figment(&path).merge(cli).extract()?;
        config.dingtalk.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a single file plus the environment.
    ///
    /// Used by the hot-reload watcher, which has no access to the original
    /// command line.
    pub fn load_file(path: &Path) -> Result<Self> {
        let config: AppConfig = Self::figment(path).extract()?;
        config.dingtalk.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            // e.g. DINGTALK_ACCESS_TOKEN=... or DINGTALK_LOG_LEVEL=debug
            .merge(Env::prefixed("DINGTALK_").map(|key| {
                let key = key.as_str().to_ascii_lowercase();
                match key.as_str() {
                    "access_token" | "enabled" => format!("dingtalk.{}", key).into(),
                    _ => key.into(),
                }
            }))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            http: HttpConfig::default(),
            dingtalk: DingtalkConfig::default(),
        }
    }
}
