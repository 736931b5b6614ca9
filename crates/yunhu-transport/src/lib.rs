//! # Yunhu Transport
//!
//! Network layer for the Yunhu bot SDK: concrete implementations of the
//! seams declared in `yunhu-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  yunhu-runtime      │  (wires everything together)
//! ├─────────────────────┤
//! │  yunhu-core         │  (HttpTransport / EventSink traits)
//! ├─────────────────────┤
//! │  yunhu-transport    │  <- this crate (reqwest + axum)
//! ├─────────────────────┤
//! │  Network (TCP/HTTP) │
//! └─────────────────────┘
//! ```
//!
//! ## Implementations
//!
//! | Type | Implements | Use case |
//! |------|------------|----------|
//! | [`HttpClient`] | `HttpTransport` | Call the platform send API |
//! | [`WebhookServer`] | serves an `EventSink` | Receive event callbacks |

pub mod http;

pub use http::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, HttpClient, WebhookHandle, WebhookServer};
