//! # Yunhu
//!
//! A webhook bot SDK for the Yunhu chat platform.
//!
//! ## Overview
//!
//! Yunhu bots receive events as webhook POSTs and reply through the
//! platform's REST API. This crate wires both directions together behind
//! one [`Bot`](yunhu_runtime::Bot) handle: inbound payloads are
//! acknowledged immediately, normalized into typed events and fanned out
//! to isolated handlers; outbound messages are validated, routed to the
//! right endpoint and sent with the bot token attached.
//!
//! ## Architecture
//!
//! ```text
//! webhook POST ──▶ WebhookServer ──▶ normalize ──▶ Event ──▶ Dispatcher ──▶ handlers
//!                 (yunhu-transport)        (yunhu-core)                        │
//!                                                                              ▼
//!                        platform REST ◀── HttpClient ◀── ApiClient ◀───── replies
//!                                        (yunhu-transport)  (yunhu-api)
//! ```
//!
//! - **yunhu-core**: event model, payload normalizer, dispatcher, capability traits
//! - **yunhu-api**: outbound message client, credential store, send receipts
//! - **yunhu-transport**: webhook server and HTTP client over axum/reqwest
//! - **yunhu-runtime**: configuration, logging and the `Bot` assembly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use yunhu::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bot = Bot::builder().token("my-bot-token").build()?;
//!     let client = bot.client();
//!
//!     bot.on(move |event: Event| {
//!         let client = Arc::clone(&client);
//!         async move {
//!             if event.body_text() == Some("ping") {
//!                 if let Some((id, kind)) = event.reply_target() {
//!                     client.send_text(id, kind, "pong").await?;
//!                 }
//!             }
//!             Ok::<_, SendError>(())
//!         }
//!     })
//!     .await;
//!
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

pub use yunhu_api as api;
pub use yunhu_core as core;
pub use yunhu_runtime as runtime;
pub use yunhu_transport as transport;

/// Prelude module for convenient imports.
///
/// This module provides all commonly used types for building bot
/// applications:
///
/// ```rust,ignore
/// use yunhu::prelude::*;
/// ```
pub mod prelude {
    // Bot assembly - main entry point
    pub use yunhu_runtime::{Bot, BotBuilder, BotConfig, ConfigLoader};

    // Event model - what handlers receive
    pub use yunhu_core::{
        ContentKind, Event, EventKind, HandlerError, HandlerResult, MessageBody, RecipientKind,
    };

    // Outbound messaging - how handlers reply
    pub use yunhu_api::{ApiClient, OutboundMessage, RecvId, SendError, SendReceipt, TokenStore};
}
