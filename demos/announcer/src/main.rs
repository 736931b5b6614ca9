//! Announcer Bot Example
//!
//! Demonstrates the lower-level send surface of the SDK: batch sends to
//! several groups at once and chunk-by-chunk streamed replies.
//!
//! # Commands
//!
//! - `/announce <text>` - markdown broadcast to every configured group
//! - `/countdown` - a streamed reply, rendered incrementally
//! - `/help` - command list
//!
//! # Usage
//!
//! ```bash
//! YUNHU_TOKEN=<your-bot-token> \
//! ANNOUNCE_GROUPS=G100,G200 \
//! cargo run --package announcer-bot
//! ```

use std::sync::Arc;

use anyhow::Result;
use futures::stream;
use tracing::{info, warn};
use yunhu::prelude::*;

// ============================================================================
// Handler Functions
// ============================================================================

/// `/announce <text>`: broadcasts markdown to every configured group.
async fn announce(
    client: Arc<ApiClient>,
    groups: Arc<[String]>,
    event: Event,
) -> Result<(), SendError> {
    let Some(text) = event.body_text().and_then(|t| t.strip_prefix("/announce ")) else {
        return Ok(());
    };

    if groups.is_empty() {
        warn!("ANNOUNCE_GROUPS is empty, dropping announcement");
        return Ok(());
    }

    let message = OutboundMessage::markdown(
        groups.to_vec(),
        RecipientKind::Group,
        format!("**Announcement**\n\n{text}"),
    )
    .batch();
    let receipt = client.send(&message).await?;
    info!(
        groups = groups.len(),
        message_id = ?receipt.message_id(),
        "announcement delivered"
    );
    Ok(())
}

/// `/countdown`: streams the reply so the platform renders it as it arrives.
async fn countdown(client: Arc<ApiClient>, event: Event) -> Result<(), SendError> {
    if event.body_text().map(str::trim) != Some("/countdown") {
        return Ok(());
    }
    let Some((id, kind)) = event.reply_target() else {
        return Ok(());
    };

    let chunks = stream::iter(["3", "2", "1", "Liftoff!"].map(|part| format!("{part}\n")));
    client.send_stream(id, kind, ContentKind::Text, chunks).await?;
    Ok(())
}

/// `/help`: sends the command list.
async fn help(client: Arc<ApiClient>, event: Event) -> Result<(), SendError> {
    if event.body_text().map(str::trim) != Some("/help") {
        return Ok(());
    }
    let Some((id, kind)) = event.reply_target() else {
        return Ok(());
    };

    client
        .send_markdown(
            id,
            kind,
            "**Announcer Bot**\n\
             - `/announce <text>` - broadcast to the configured groups\n\
             - `/countdown` - streamed reply demo\n\
             - `/help` - this list",
        )
        .await?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let bot = Bot::new()?;

    if !bot.token_store().is_initialized() {
        warn!("No bot token configured; set YUNHU_TOKEN or add `token` to yunhu.toml");
    }

    let groups: Arc<[String]> = std::env::var("ANNOUNCE_GROUPS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if groups.is_empty() {
        warn!("ANNOUNCE_GROUPS is not set; /announce has no destination");
    }

    let client = bot.client();

    bot.on({
        let client = Arc::clone(&client);
        let groups = Arc::clone(&groups);
        move |event: Event| announce(Arc::clone(&client), Arc::clone(&groups), event)
    })
    .await;

    bot.on({
        let client = Arc::clone(&client);
        move |event: Event| countdown(Arc::clone(&client), event)
    })
    .await;

    bot.on({
        let client = Arc::clone(&client);
        move |event: Event| help(Arc::clone(&client), event)
    })
    .await;

    bot.run().await?;

    Ok(())
}
