//! HTTP transport implementations.
//!
//! This module provides the outbound reqwest client and the inbound
//! webhook server.

mod client;
pub use client::HttpClient;

mod server;
pub use server::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, WebhookHandle, WebhookServer};
