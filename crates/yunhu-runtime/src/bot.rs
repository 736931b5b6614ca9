//! Bot assembly and lifecycle.
//!
//! [`Bot`] wires the three layers together: it loads configuration, builds
//! the outbound [`ApiClient`] over a real HTTP transport, and runs the
//! webhook server whose payloads flow through the normalizer into the
//! [`Dispatcher`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use yunhu_runtime::Bot;
//!
//! // Simplest way - auto-loads config from the current directory
//! let bot = Bot::new()?;
//!
//! // Custom configuration
//! let bot = Bot::builder()
//!     .config_file("config/yunhu.toml")
//!     .token("my-bot-token")
//!     .build()?;
//!
//! bot.on(|event| async move { /* ... */ }).await;
//! bot.run().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{BotConfig, ConfigLoader};
use crate::error::RuntimeResult;
use crate::logging;
use yunhu_api::{ApiClient, TokenStore};
use yunhu_core::{
    BoxedEventSink, BoxedHttpTransport, Dispatcher, Event, EventHandler, EventSink,
    IntoHandlerResult, normalize,
};
use yunhu_transport::{HttpClient, WebhookHandle, WebhookServer};

/// A fully assembled bot: configuration, outbound client, dispatcher and
/// webhook server in one handle.
///
/// Handlers are registered on the built bot, so they can capture the
/// outbound [`ApiClient`] and reply to the events they receive:
///
/// ```rust,ignore
/// let bot = Bot::new()?;
/// let client = bot.client();
///
/// bot.on(move |event: Event| {
///     let client = Arc::clone(&client);
///     async move {
///         if let Some((id, kind)) = event.reply_target() {
///             client.send_text(id, kind, "hello").await?;
///         }
///         Ok::<_, SendError>(())
///     }
/// })
/// .await;
///
/// bot.run().await?;
/// ```
pub struct Bot {
    /// The configuration.
    config: BotConfig,
    /// Outbound API client, shared with handlers.
    client: Arc<ApiClient>,
    /// Registered handlers for event dispatching.
    dispatcher: Arc<RwLock<Dispatcher>>,
    /// Inbound payload sink handed to the webhook server.
    sink: BoxedEventSink,
}

impl Bot {
    /// Creates a new bot with automatic configuration loading.
    ///
    /// This will:
    /// 1. Search for `yunhu.toml` or `config.toml` in the current directory
    /// 2. Initialize logging based on the configuration
    /// 3. Build the outbound API client over a real HTTP transport
    ///
    /// If no configuration file is found, default settings are used.
    pub fn new() -> RuntimeResult<Self> {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                BotConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates a bot builder for custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let bot = Bot::builder()
    ///     .config_file("config/production.toml")
    ///     .token("my-bot-token")
    ///     .build()?;
    /// ```
    pub fn builder() -> BotBuilder {
        BotBuilder::new()
    }

    /// Creates a bot from pre-loaded configuration.
    ///
    /// This initializes logging based on the configuration and, when the
    /// configuration carries a token, seeds the credential store with it.
    pub fn from_config(config: &BotConfig) -> RuntimeResult<Self> {
        Self::assemble(config.clone(), None, None)
    }

    /// Assembles the bot from its parts.
    ///
    /// A caller-provided transport replaces the real HTTP client; a
    /// caller-provided token takes precedence over the configured one.
    fn assemble(
        config: BotConfig,
        transport: Option<BoxedHttpTransport>,
        token_override: Option<String>,
    ) -> RuntimeResult<Self> {
        // try_init won't panic if logging is already initialized
        logging::init_from_config(&config.logging);

        let transport = transport.unwrap_or_else(|| {
            Arc::new(HttpClient::with_timeout(Duration::from_secs(
                config.api.timeout_secs,
            )))
        });
        let client = ApiClient::new(transport)
            .with_base_url(config.api.base_url.clone())
            .wait_for_token(config.api.wait_for_token);

        if let Some(token) = token_override.or_else(|| config.token.clone()) {
            client.token_store().init(&token)?;
        }

        info!(
            log_level = %config.logging.level,
            api_base = %config.api.base_url,
            "Bot assembled from configuration"
        );

        let dispatcher = Arc::new(RwLock::new(Dispatcher::new()));
        let sink: BoxedEventSink = Arc::new(Pipeline {
            dispatcher: Arc::clone(&dispatcher),
        });

        Ok(Self {
            config,
            client: Arc::new(client),
            dispatcher,
            sink,
        })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Returns the outbound API client, for handlers that reply.
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }

    /// Returns the credential store, for deferred token initialization.
    pub fn token_store(&self) -> Arc<TokenStore> {
        self.client.token_store()
    }

    /// Registers an async event handler.
    ///
    /// Handlers run concurrently and isolated: one failing or panicking
    /// handler never affects the others.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// bot.on(|event: Event| async move {
    ///     tracing::info!(kind = %event.kind, "event received");
    /// })
    /// .await;
    /// ```
    pub async fn on<F, Fut, R>(&self, f: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        self.dispatcher.write().await.on(f);
    }

    /// Registers a plain (non-async) event handler.
    pub async fn on_blocking<F, R>(&self, f: F)
    where
        F: Fn(&Event) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.dispatcher.write().await.on_blocking(f);
    }

    /// Registers an [`EventHandler`] implementation.
    pub async fn register<H>(&self, handler: H)
    where
        H: EventHandler,
    {
        self.dispatcher.write().await.register(handler);
    }

    /// Returns the number of registered handlers.
    pub async fn handler_count(&self) -> usize {
        self.dispatcher.read().await.handler_count()
    }

    /// Starts the webhook server and returns its handle.
    ///
    /// Most binaries call [`run`](Self::run) instead; `start` is for callers
    /// that manage the server lifetime themselves.
    pub async fn start(&self) -> RuntimeResult<WebhookHandle> {
        if self.dispatcher.read().await.is_empty() {
            warn!("No handlers registered, inbound events will be dropped");
        }

        let webhook = &self.config.webhook;
        let handle = WebhookServer::new()
            .host(webhook.host.clone())
            .port(webhook.port)
            .path(webhook.path.clone())
            .serve(Arc::clone(&self.sink))
            .await?;

        Ok(handle)
    }

    /// Runs the bot until a shutdown signal is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        let handle = self.start().await?;

        info!(addr = %handle.addr(), "Bot is now running. Press Ctrl+C to stop.");

        self.wait_for_shutdown().await;

        handle.shutdown().await;
        info!("Bot stopped");

        Ok(())
    }

    /// Runs the bot with a custom shutdown future.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let handle = self.start().await?;

        shutdown.await;

        handle.shutdown().await;

        Ok(())
    }

    /// Waits for shutdown signals (Ctrl+C or SIGTERM).
    async fn wait_for_shutdown(&self) {
        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to register SIGTERM handler");

            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
            info!("Received Ctrl+C, shutting down");
        }
    }
}

// =============================================================================
// Event Pipeline
// =============================================================================

/// The inbound half of the bot: normalizes raw webhook payloads and fans
/// them out through the dispatcher.
///
/// Payloads that fail normalization are logged and discarded here; the
/// webhook server has already acknowledged them by the time this runs.
struct Pipeline {
    dispatcher: Arc<RwLock<Dispatcher>>,
}

#[async_trait]
impl EventSink for Pipeline {
    async fn on_payload(&self, payload: Value) {
        match normalize(&payload) {
            Ok(event) => self.dispatcher.read().await.dispatch(event).await,
            Err(e) => warn!(error = %e, "Discarding payload"),
        }
    }
}

// =============================================================================
// BotBuilder
// =============================================================================

/// Builder for creating a [`Bot`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let bot = Bot::builder()
///     .config_file("config/production.toml")
///     .token("my-bot-token")
///     .build()?;
/// ```
pub struct BotBuilder {
    config_loader: ConfigLoader,
    transport: Option<BoxedHttpTransport>,
    token: Option<String>,
}

impl BotBuilder {
    /// Creates a new bot builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            transport: None,
            token: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: BotConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets the bot token, taking precedence over the configured one.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces the HTTP transport the API client sends through.
    pub fn transport(mut self, transport: BoxedHttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the bot.
    pub fn build(self) -> RuntimeResult<Bot> {
        let config = self.config_loader.load()?;
        Bot::assemble(config, self.transport, self.token)
    }
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
