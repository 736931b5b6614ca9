//! Event dispatcher.
//!
//! This module provides the [`Dispatcher`], which fans one normalized
//! [`Event`] out to every registered handler.
//!
//! # Handler abstraction
//!
//! All registration paths converge on one trait, [`EventHandler`]: "can be
//! invoked with an event, produces a completion signal". Two adapter
//! variants wrap the closure forms so the fan-out logic is written once
//! against the trait:
//!
//! - suspending: `Fn(Event) -> Future` (registered via [`Dispatcher::on`])
//! - immediate: `Fn(&Event) -> _`, run inline inside its task (registered
//!   via [`Dispatcher::on_blocking`])
//!
//! ```rust,ignore
//! let mut dispatcher = Dispatcher::new();
//!
//! dispatcher.on(|event: Event| async move {
//!     handle(event).await
//! });
//! dispatcher.on_blocking(|event: &Event| {
//!     tracing::info!(kind = %event.kind, "seen");
//! });
//! ```
//!
//! # Isolation
//!
//! `dispatch` spawns one task per handler and waits for all of them. A
//! handler returning an error, or panicking, is logged and never affects
//! its siblings nor the caller. No ordering is guaranteed between handlers.

use std::any::type_name;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};

use crate::error::{HandlerError, HandlerResult};
use crate::event::Event;

// ============================================================================
// Handler Abstraction
// ============================================================================

/// A registered consumer of normalized events.
///
/// Most code registers closures through [`Dispatcher::on`] or
/// [`Dispatcher::on_blocking`]; implementing this trait directly is for
/// handlers that carry their own state.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one event. Errors are logged by the dispatcher and isolated
    /// from other handlers.
    async fn on_event(&self, event: &Event) -> HandlerResult;
}

/// Conversion of handler return values into a [`HandlerResult`].
///
/// Lets closures return either `()` or any `Result<(), E>` whose error can
/// become a [`HandlerError`], without wrapping at every registration site.
pub trait IntoHandlerResult {
    /// Converts the return value.
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<HandlerError>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Suspending adapter: wraps an async closure.
struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut, R> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerResult,
{
    async fn on_event(&self, event: &Event) -> HandlerResult {
        (self.f)(event.clone()).await.into_handler_result()
    }
}

/// Immediate adapter: wraps a plain closure, invoked inline.
struct BlockingHandler<F> {
    f: F,
}

#[async_trait]
impl<F, R> EventHandler for BlockingHandler<F>
where
    F: Fn(&Event) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    async fn on_event(&self, event: &Event) -> HandlerResult {
        (self.f)(event).into_handler_result()
    }
}

/// A handler plus the name it is reported under.
#[derive(Clone)]
struct Registered {
    name: Arc<str>,
    handler: Arc<dyn EventHandler>,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Fans normalized events out to every registered handler.
///
/// Handlers run as an unordered concurrent set, one task each;
/// [`dispatch`](Self::dispatch) returns once all of them have settled.
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync`; registration happens before it is shared.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Registered>,
}

impl Dispatcher {
    /// Creates a new, empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registers an [`EventHandler`] implementation.
    pub fn register<H>(&mut self, handler: H) -> &mut Self
    where
        H: EventHandler,
    {
        self.handlers.push(Registered {
            name: type_name::<H>().into(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Registers an async closure. The closure receives its own copy of the
    /// event and its future runs on a dedicated task.
    pub fn on<F, Fut, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.push(Registered {
            name: type_name::<F>().into(),
            handler: Arc::new(FnHandler { f }),
        });
        self
    }

    /// Registers a plain closure, invoked inline within its task.
    pub fn on_blocking<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Event) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.handlers.push(Registered {
            name: type_name::<F>().into(),
            handler: Arc::new(BlockingHandler { f }),
        });
        self
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatches one event to every handler.
    ///
    /// Spawns one task per handler and returns after all of them have
    /// settled. Handler errors and panics are logged per handler; nothing
    /// propagates to the caller.
    #[instrument(level = "debug", skip_all, fields(kind = %event.kind))]
    pub async fn dispatch(&self, event: Event) {
        if self.handlers.is_empty() {
            debug!("no handlers registered, dropping event");
            return;
        }
        debug!(handlers = self.handlers.len(), "dispatching event");

        let event = Arc::new(event);
        let mut tasks = JoinSet::new();
        for registered in &self.handlers {
            let registered = registered.clone();
            let event = Arc::clone(&event);
            tasks.spawn(async move {
                let outcome = registered.handler.on_event(&event).await;
                (registered.name, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(err))) => {
                    warn!(handler = %name, error = %err, "handler failed");
                }
                Err(err) if err.is_panic() => {
                    error!(error = %err, "handler panicked");
                }
                Err(err) => {
                    debug!(error = %err, "handler task cancelled");
                }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}
