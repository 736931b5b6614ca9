//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while assembling or running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential handling failed.
    #[error("Credential error: {0}")]
    Credential(#[from] yunhu_api::CredentialError),

    /// Transport-level failure, e.g. the webhook listener could not bind.
    #[error("Transport error: {0}")]
    Transport(#[from] yunhu_core::TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
