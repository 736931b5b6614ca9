//! Outbound half of the SDK: credentials and the platform send API.
//!
//! - [`TokenStore`] holds the bot token behind an initialize-once gate.
//! - [`OutboundMessage`] and [`RecvId`] model what to send and to whom.
//! - [`ApiClient`] validates, builds the wire payload, POSTs it through a
//!   [`HttpTransport`](yunhu_core::HttpTransport), and returns a
//!   [`SendReceipt`].
//!
//! Nothing in here binds to a concrete HTTP stack; the transport is
//! injected, so every path is testable with a canned implementation.

pub mod client;
pub mod credential;
pub mod error;
pub mod message;
pub mod receipt;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use credential::TokenStore;
pub use error::{CredentialError, CredentialResult, SendError, SendResult};
pub use message::{OutboundMessage, RecvId};
pub use receipt::SendReceipt;
