//! Error types for the API layer.

use thiserror::Error;
use yunhu_core::{ContentKind, TransportError};

// =============================================================================
// Credential Errors
// =============================================================================

/// Errors from the bot token store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// A token was requested before one was set.
    #[error("bot token is not initialized")]
    NotInitialized,

    /// A token was already set; re-initialization is rejected, never
    /// silently overwritten.
    #[error("bot token is already initialized")]
    AlreadyInitialized,

    /// The supplied token is empty after trimming.
    #[error("bot token must be a non-empty string")]
    InvalidToken,
}

// =============================================================================
// Send Errors
// =============================================================================

/// Errors from the outbound message path.
///
/// Validation and credential failures short-circuit before any transport
/// call; transport failures are surfaced, not retried.
#[derive(Debug, Error)]
pub enum SendError {
    /// The credential gate failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The message's content type cannot be sent over this endpoint.
    #[error("content type `{0}` cannot be sent")]
    UnsupportedContentType(ContentKind),

    /// The recipients do not match the batch flag.
    #[error("invalid recipients: {0}")]
    InvalidRecipients(&'static str),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The platform's response is not a JSON object with an integer `code`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Result type for send operations.
pub type SendResult<T> = Result<T, SendError>;
