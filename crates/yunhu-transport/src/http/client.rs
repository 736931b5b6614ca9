//! reqwest-backed transport implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, header};
use serde_json::Value;
use tracing::trace;
use yunhu_core::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, ResponseBody,
    TransportError, TransportResult,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpTransport`] implementation over a pooled reqwest client.
///
/// The client enforces a request timeout (30 seconds unless overridden) and
/// negotiates the response body from its `Content-Type`: JSON is parsed,
/// text stays a string, anything else stays raw bytes.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            query,
            headers,
            body,
        } = request;

        trace!(%method, %url, "sending HTTP request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Stream(chunks) => builder.body(reqwest::Body::wrap_stream(chunks)),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/json") => {
                let value: Value = response
                    .json()
                    .await
                    .map_err(|e| TransportError::Decode(e.to_string()))?;
                ResponseBody::Json(value)
            }
            Some(ct) if ct.starts_with("text/") => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| TransportError::Decode(e.to_string()))?;
                ResponseBody::Text(text)
            }
            _ => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| TransportError::Decode(e.to_string()))?;
                ResponseBody::Bytes(bytes.to_vec())
            }
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
