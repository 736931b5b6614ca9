//! Webhook server.
//!
//! The platform delivers events as HTTP POSTs with a JSON body. The server's
//! contract is small:
//!
//! - a body that parses as JSON is acknowledged with `{"code":0,"message":"ok"}`
//!   immediately; the payload is handed to the [`EventSink`] on a detached
//!   task, so slow handlers never delay the acknowledgement,
//! - anything else is rejected with status 400 and `{"code":-1,"message":...}`.
//!
//! [`EventSink`]: yunhu_core::EventSink

use std::net::SocketAddr;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use yunhu_core::{BoxedEventSink, TransportError, TransportResult};

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default webhook path.
pub const DEFAULT_PATH: &str = "/webhook";

/// Configures and starts the webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookServer {
    host: String,
    port: u16,
    path: String,
}

impl WebhookServer {
    /// Creates a server with the default host, port, and path.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
        }
    }

    /// Sets the bind host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the bind port. Port 0 binds an ephemeral port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the webhook path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Binds the listener and starts serving in a background task.
    ///
    /// Every accepted payload is forwarded to `sink`.
    pub async fn serve(self, sink: BoxedEventSink) -> TransportResult<WebhookHandle> {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        let router = Router::new().route(&path, post(receive)).with_state(sink);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Io(e.to_string()))?;

        info!(addr = %local_addr, path = %path, "webhook server listening");

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "webhook server error");
            }
        });

        Ok(WebhookHandle {
            addr: local_addr,
            cancel,
            task,
        })
    }
}

impl Default for WebhookServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running webhook server.
#[derive(Debug)]
pub struct WebhookHandle {
    addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WebhookHandle {
    /// The address the listener actually bound.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections, waits for in-flight requests to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "webhook server task failed");
        }
    }
}

/// Axum handler for webhook POSTs.
async fn receive(State(sink): State<BoxedEventSink>, body: Bytes) -> (StatusCode, Json<Value>) {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            debug!(len = body.len(), "webhook payload accepted");
            tokio::spawn(async move {
                sink.on_payload(payload).await;
            });
            (StatusCode::OK, Json(json!({ "code": 0, "message": "ok" })))
        }
        Err(e) => {
            warn!(error = %e, "webhook payload rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "code": -1, "message": e.to_string() })),
            )
        }
    }
}
