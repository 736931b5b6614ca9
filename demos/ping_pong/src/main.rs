//! Ping-Pong Bot Example
//!
//! The smallest useful Yunhu bot: replies "pong" to any message saying
//! "ping", and logs every event it sees.
//!
//! # Usage
//!
//! ```bash
//! YUNHU_TOKEN=<your-bot-token> cargo run --package ping-pong-bot
//! ```
//!
//! The webhook server listens on `0.0.0.0:5000` at `/webhook` by default;
//! point the bot's webhook URL at it in the platform console. Settings can
//! also come from a `yunhu.toml` in the working directory:
//!
//! ```toml
//! token = "your-bot-token"
//!
//! [webhook]
//! port = 8080
//! ```

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use yunhu::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let bot = Bot::new()?;

    if !bot.token_store().is_initialized() {
        warn!("No bot token configured; set YUNHU_TOKEN or add `token` to yunhu.toml");
    }

    // Log every event, whatever the kind.
    bot.on_blocking(|event: &Event| {
        info!(kind = %event.kind, sender = ?event.sender_id, "event received");
    })
    .await;

    // Reply "pong" to any text message saying "ping".
    let client = bot.client();
    bot.on(move |event: Event| {
        let client = Arc::clone(&client);
        async move {
            if event.kind == EventKind::Message && event.body_text() == Some("ping") {
                if let Some((id, kind)) = event.reply_target() {
                    let receipt = client.send_text(id, kind, "pong").await?;
                    info!(message_id = ?receipt.message_id(), "pong sent");
                }
            }
            Ok::<_, SendError>(())
        }
    })
    .await;

    bot.run().await?;

    Ok(())
}
