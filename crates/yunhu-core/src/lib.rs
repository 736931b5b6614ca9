//! # Yunhu Core
//!
//! Core engine of the Yunhu bot SDK: the canonical event model, the
//! payload normalizer, the handler/dispatch machinery, and the capability
//! seams the outer layers plug into.
//!
//! ## Architecture
//!
//! ```text
//! webhook POST ──▶ EventSink ──▶ normalize ──▶ Event ──▶ Dispatcher ──▶ handlers
//!                (yunhu-transport)                               │
//!                                                                ▼
//!                                    ApiClient ──▶ HttpTransport ──▶ platform REST
//!                                   (yunhu-api)   (yunhu-transport)
//! ```
//!
//! This crate owns the middle of both arrows and none of the ends: inbound
//! and outbound I/O are behind the [`EventSink`] and [`HttpTransport`]
//! traits, which keeps every piece testable with plain values.
//!
//! ## Modules
//!
//! - [`event`] - [`Event`], [`EventKind`], [`ContentKind`], [`RecipientKind`]
//! - [`normalize`](mod@normalize) - raw payload → [`Event`]
//! - [`dispatch`] - [`Dispatcher`], [`EventHandler`]
//! - [`capability`] - [`HttpTransport`], [`EventSink`], request/response model
//! - [`error`] - per-layer error enums and result aliases

pub mod capability;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod normalize;

pub use capability::{
    BoxedEventSink, BoxedHttpTransport, ByteStream, EventSink, HttpMethod, HttpRequest,
    HttpResponse, HttpTransport, RequestBody, ResponseBody,
};
pub use dispatch::{Dispatcher, EventHandler, IntoHandlerResult};
pub use error::{
    HandlerError, HandlerResult, PayloadError, PayloadResult, TransportError, TransportResult,
};
pub use event::{ContentKind, Event, EventKind, MessageBody, RecipientKind};
pub use normalize::normalize;
