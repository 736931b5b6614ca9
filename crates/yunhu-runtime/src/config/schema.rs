//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotConfig {
    /// Bot API token. When absent, the token must be initialized at runtime
    /// through the credential store.
    #[serde(default)]
    pub token: Option<String>,

    /// Webhook endpoint settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Outbound API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BotConfig {
    /// Checks invariants the type system cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.webhook.path.is_empty() {
            return Err(ConfigError::validation("webhook.path must not be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::validation(format!(
                "api.base_url must be an http(s) URL, got: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::validation("api.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Webhook endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. Port 0 binds an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path for the callback endpoint.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

fn default_host() -> String {
    yunhu_transport::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    yunhu_transport::DEFAULT_PORT
}

fn default_path() -> String {
    yunhu_transport::DEFAULT_PATH.to_string()
}

/// Outbound API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// When set, sends wait for a token instead of failing while the store
    /// is uninitialized.
    #[serde(default)]
    pub wait_for_token: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            wait_for_token: false,
        }
    }
}

fn default_base_url() -> String {
    yunhu_api::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module level overrides, e.g. `yunhu_transport = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            filters: HashMap::new(),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact format (default).
    #[default]
    Compact,
    /// Standard multi-field format.
    Full,
    /// Multi-line human-friendly format.
    Pretty,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output (default).
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A file; requires `logging.file_path`.
    File,
}

#[cfg(test)]
mod tests {
    use figment::Figment;
    use figment::providers::{Format, Serialized, Toml};

    use super::*;

    #[test]
    fn defaults_match_the_platform() {
        let config = BotConfig::default();
        assert_eq!(config.token, None);
        assert_eq!(config.webhook.host, "0.0.0.0");
        assert_eq!(config.webhook.port, 5000);
        assert_eq!(config.webhook.path, "/webhook");
        assert_eq!(config.api.base_url, yunhu_api::DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.api.wait_for_token);
        assert_eq!(config.logging.level, LogLevel::Info);
        config.validate().unwrap();
    }

    #[test]
    fn toml_overrides_layer_over_defaults() {
        let config: BotConfig = Figment::from(Serialized::defaults(BotConfig::default()))
            .merge(Toml::string(
                r#"
                token = "tok-file"

                [webhook]
                port = 8080
                path = "events"

                [logging]
                level = "debug"
                format = "pretty"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.token.as_deref(), Some("tok-file"));
        assert_eq!(config.webhook.port, 8080);
        assert_eq!(config.webhook.path, "events");
        assert_eq!(config.webhook.host, "0.0.0.0");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = BotConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.webhook.path = String::new();
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
