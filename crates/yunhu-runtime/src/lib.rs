//! Yunhu Runtime - Assembly and lifecycle layer for the Yunhu bot SDK.
//!
//! This crate provides:
//! - Bot assembly and lifecycle (`Bot`, `BotBuilder`)
//! - Layered configuration loading (`ConfigLoader`, `BotConfig`)
//! - Logging configuration (`LoggingBuilder`)
//!
//! ```ignore
//! use yunhu_runtime::Bot;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Loads yunhu.toml from the current directory, falls back to defaults
//!     let bot = Bot::new()?;
//!     let client = bot.client();
//!
//!     // Handlers are registered on the built bot and can capture the client
//!     bot.on(move |event| {
//!         let client = std::sync::Arc::clone(&client);
//!         async move {
//!             if let Some((id, kind)) = event.reply_target() {
//!                 client.send_text(id, kind, "hello").await?;
//!             }
//!             Ok::<_, yunhu_api::SendError>(())
//!         }
//!     })
//!     .await;
//!
//!     // Run until Ctrl+C
//!     bot.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Configuration is merged from defaults, an optional `yunhu.toml` (or
//! `config.toml`) and `YUNHU_*` environment variables, in that order. See
//! [`ConfigLoader`] for the full pipeline.

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use bot::{Bot, BotBuilder};
pub use config::{BotConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
