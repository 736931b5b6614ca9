//! Capability seams between the SDK layers.
//!
//! The core never talks to the network itself. It declares two narrow
//! traits and lets the outer layers plug implementations in:
//!
//! - [`HttpTransport`] - one async call: request in, response out. The
//!   `yunhu-transport` crate implements it with reqwest; tests implement it
//!   with canned responses.
//! - [`EventSink`] - where the webhook server hands parsed payloads. The
//!   runtime implements it with normalize-then-dispatch.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::TransportResult;

// ============================================================================
// Request / Response Model
// ============================================================================

/// A streaming request body: chunks of bytes produced on demand.
pub type ByteStream = BoxStream<'static, std::io::Result<Vec<u8>>>;

/// HTTP methods the SDK uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an outbound request.
pub enum RequestBody {
    /// No body.
    Empty,
    /// A JSON document, sent with `application/json`.
    Json(Value),
    /// A chunked byte stream (used by the streaming send endpoint).
    Stream(ByteStream),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An outbound HTTP request, transport-agnostic.
///
/// Query parameters are kept as pairs and encoded by the transport, so
/// values (notably the bot token) never need manual URL-encoding.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL, without query parameters.
    pub url: String,
    /// Query parameters, appended and percent-encoded by the transport.
    pub query: Vec<(String, String)>,
    /// Additional request headers.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Creates a POST request carrying a JSON body.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    /// Creates a POST request carrying a streaming body.
    pub fn post_stream(url: impl Into<String>, body: ByteStream) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Stream(body),
        }
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Body of a response, negotiated from the `Content-Type` header:
/// `application/json` parses to [`Json`](ResponseBody::Json), `text/*`
/// stays a string, everything else stays raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON document.
    Json(Value),
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

/// A successful (2xx) HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// The response `Content-Type`, when present.
    pub content_type: Option<String>,
    /// Negotiated response body.
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Returns the JSON body, if the response was JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the response, returning the JSON body if there was one.
    pub fn into_json(self) -> Option<Value> {
        match self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

// ============================================================================
// Capability Traits
// ============================================================================

/// HTTP transport capability.
///
/// Implementations own connection pooling, timeouts, TLS, and response
/// content negotiation. Non-2xx statuses and network failures are reported
/// as [`TransportError`](crate::TransportError); a returned response is
/// always a successful one.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one HTTP request.
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse>;
}

/// Shared, type-erased transport handle.
pub type BoxedHttpTransport = Arc<dyn HttpTransport>;

/// Consumer of parsed webhook payloads.
///
/// The webhook server parses JSON and acknowledges the platform; what
/// happens to the payload afterwards (normalization, dispatch) is behind
/// this seam.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Accepts one parsed payload.
    async fn on_payload(&self, payload: Value);
}

/// Shared, type-erased sink handle.
pub type BoxedEventSink = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_builders_accumulate_query_and_headers() {
        let request = HttpRequest::post_json("https://example.com/send", json!({"a": 1}))
            .query("token", "t0k/en")
            .header("X-Trace", "1");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://example.com/send");
        assert_eq!(request.query, vec![("token".to_string(), "t0k/en".to_string())]);
        assert_eq!(request.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert!(matches!(request.body, RequestBody::Json(_)));
    }

    #[test]
    fn response_json_accessor_only_matches_json_bodies() {
        let response = HttpResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: ResponseBody::Json(json!({"code": 0})),
        };
        assert_eq!(response.json(), Some(&json!({"code": 0})));

        let response = HttpResponse {
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: ResponseBody::Text("ok".to_string()),
        };
        assert_eq!(response.json(), None);
    }
}
