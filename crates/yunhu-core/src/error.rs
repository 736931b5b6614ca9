//! Unified error types for the SDK core.
//!
//! This module provides the error types shared across core components.
//! API-layer errors (credential and send failures) are defined in `yunhu-api`.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

// =============================================================================
// Payload Errors
// =============================================================================

/// Errors raised while turning a raw webhook payload into an [`Event`].
///
/// Normalization is total over the payload tree: missing or mistyped nested
/// fields degrade to `None` on the resulting event. The only hard failures
/// are an absent or unrecognized top-level event type.
///
/// [`Event`]: crate::Event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload carries no `header.eventType` field.
    #[error("payload has no header.eventType field")]
    MissingEventType,

    /// The `header.eventType` value is not a known event type.
    #[error("unrecognized event type: {0}")]
    UnknownEventType(String),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in HTTP transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// A socket operation failed (bind, accept).
    #[error("i/o error: {0}")]
    Io(String),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The server replied with a non-success HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Response body text, kept for diagnostics.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

// =============================================================================
// Handler Errors
// =============================================================================

/// An error reported by a failing event handler.
///
/// This is a thin wrapper over a boxed error so handler code can use `?`
/// with any error type. It does not implement [`std::error::Error`] itself;
/// the blanket `From<E: Error>` conversion requires that.
pub struct HandlerError(Box<dyn StdError + Send + Sync>);

impl HandlerError {
    /// Wraps any boxable error.
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self(err.into())
    }

    /// Creates a handler error from a plain message.
    pub fn msg(msg: impl fmt::Display) -> Self {
        Self(msg.to_string().into())
    }

    /// Returns a reference to the underlying error.
    pub fn inner(&self) -> &(dyn StdError + Send + Sync) {
        self.0.as_ref()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for payload normalization.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type returned by event handlers.
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_from_std_error() {
        fn fails() -> HandlerResult {
            let _: i32 = "x".parse()?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("invalid digit"));
    }

    #[test]
    fn handler_error_from_message() {
        let err = HandlerError::msg("reply rejected");
        assert_eq!(err.to_string(), "reply rejected");
    }
}
