//! Configuration management for DocuBot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DocubotError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default location of the configuration file relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Main configuration structure for DocuBot
///
/// Holds the service location, chat behavior, and upload flow settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RAG service connection settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat session settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Upload flow settings
    #[serde(default)]
    pub upload: UploadConfig,
}

/// RAG service connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Scheme, host and port of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix under which the RAG routes are mounted
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1/rag".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ServerConfig {
    /// Full URL of the RAG API root (base URL joined with the prefix)
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::config::ServerConfig;
    ///
    /// let server = ServerConfig::default();
    /// assert_eq!(server.api_root(), "http://localhost:8000/api/v1/rag");
    /// ```
    pub fn api_root(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Assistant message appended when a chat request fails
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_fallback_message() -> String {
    "Sorry, something went wrong while contacting the assistant. Please try again.".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_message: default_fallback_message(),
        }
    }
}

/// Upload flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// How long the success state is shown before returning to idle (milliseconds)
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,

    /// Largest file accepted for upload (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_success_display_ms() -> u64 {
    3_000
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            success_display_ms: default_success_display_ms(),
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

impl UploadConfig {
    /// Success display window as a `Duration`
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &Path, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Pick the configuration file to load
    ///
    /// An explicit path always wins. Otherwise `config/config.yaml` in the
    /// working directory is used when present, then the per-user config
    /// directory.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(path) = explicit {
            return PathBuf::from(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return local;
        }

        ProjectDirs::from("", "", "docubot")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or(local)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocubotError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DocubotError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("DOCUBOT_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: DOCUBOT_BASE_URL");
            self.server.base_url = base_url;
        }

        if let Ok(prefix) = std::env::var("DOCUBOT_API_PREFIX") {
            tracing::debug!(api_prefix = %prefix, "Env override: DOCUBOT_API_PREFIX");
            self.server.api_prefix = prefix;
        }

        if let Ok(timeout) = std::env::var("DOCUBOT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid DOCUBOT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(display_ms) = std::env::var("DOCUBOT_SUCCESS_DISPLAY_MS") {
            if let Ok(value) = display_ms.parse() {
                self.upload.success_display_ms = value;
            } else {
                tracing::warn!("Invalid DOCUBOT_SUCCESS_DISPLAY_MS: {}", display_ms);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!(base_url = %base_url, "CLI override: --base-url");
            self.server.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL, the API prefix
    /// is not absolute, or any numeric limit is zero
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.server.base_url).map_err(|e| {
            DocubotError::Config(format!(
                "Invalid server.base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(DocubotError::Config(format!(
                "server.base_url must use http or https, got '{}'",
                base.scheme()
            ))
            .into());
        }

        if !self.server.api_prefix.starts_with('/') {
            return Err(DocubotError::Config(
                "server.api_prefix must start with '/'".to_string(),
            )
            .into());
        }

        if self.server.timeout_seconds == 0 {
            return Err(DocubotError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.fallback_message.trim().is_empty() {
            return Err(DocubotError::Config(
                "chat.fallback_message cannot be empty".to_string(),
            )
            .into());
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(DocubotError::Config(
                "upload.max_file_size_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
