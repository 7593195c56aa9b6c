//! Configuration types for the bubble engine.
//!
//! This module defines the configuration schema: where the chat backend
//! lives, how long the session gate lingers after a successful start, and
//! how file uploads interact with in-flight requests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory (relative to the working directory) holding the default config.
pub const CONFIG_DIR: &str = ".bubble";

/// File name of the config inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Main configuration for bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the chat backend (chat-start, chat-completion, upload).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Cosmetic delay between a successful session start and the gate opening.
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// Whether uploads may overlap with other requests.
    #[serde(default)]
    pub upload_policy: UploadPolicy,

    /// Optional client-side timeout applied to every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_start_delay_ms() -> u64 {
    2000
}

/// How uploads are scheduled relative to other requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadPolicy {
    /// Uploads run alongside chats and other uploads; acknowledgments are
    /// appended in completion order.
    #[default]
    Concurrent,
    /// An upload is refused while any chat or upload is in flight.
    Exclusive,
}

impl std::fmt::Display for UploadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concurrent => write!(f, "concurrent"),
            Self::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, `<work_dir>/.bubble/config.json`
    /// is used when present and defaults otherwise.
    pub fn resolve(explicit: Option<&Path>, work_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = Self::default_path(work_dir);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default config location for a working directory.
    pub fn default_path(work_dir: &Path) -> PathBuf {
        work_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Override the backend base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.api_base_url = url.into();
        self.validate()?;
        Ok(self)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()));
        }
        Ok(())
    }

    /// Full URL for an endpoint path such as `/chat`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url.trim().trim_end_matches('/'))
    }

    /// Delay applied after a successful session start.
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            start_delay_ms: default_start_delay_ms(),
            upload_policy: UploadPolicy::default(),
            request_timeout_secs: None,
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Base URL without an http(s) scheme.
    #[error("Invalid apiBaseUrl (expected http:// or https://): {0}")]
    InvalidBaseUrl(String),
}
