//! Configuration module for the bot runtime.
//!
//! This module provides TOML-based configuration loading with environment
//! variable overrides, plus validation of the loaded values.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{
    ApiConfig, BotConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, WebhookConfig,
};
