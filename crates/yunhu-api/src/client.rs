//! The outbound API client.
//!
//! [`ApiClient`] turns an [`OutboundMessage`] into a wire request and hands
//! it to the configured transport:
//!
//! 1. fetch the bot token (fail fast, or wait, per configuration),
//! 2. validate the message (sendable content type, recipients matching the
//!    endpoint shape),
//! 3. build the JSON payload and pick `send` or `batch_send`,
//! 4. POST, then wrap the response body in a [`SendReceipt`].
//!
//! Steps 1 to 3 complete before the transport is touched, so a rejected
//! message never produces network traffic.

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::{Map, Value};
use tracing::debug;
use yunhu_core::{
    BoxedHttpTransport, ByteStream, ContentKind, HttpRequest, HttpResponse, RecipientKind,
};

use crate::credential::TokenStore;
use crate::error::{CredentialResult, SendError, SendResult};
use crate::message::{OutboundMessage, RecvId};
use crate::receipt::SendReceipt;

/// Base URL of the platform's bot API.
pub const DEFAULT_BASE_URL: &str = "https://chat-go.jwzhd.com/open-apis/v1/bot/";

const SEND: &str = "send";
const BATCH_SEND: &str = "batch_send";
const STREAM_SEND: &str = "send-stream";

/// Client for the platform's outbound endpoints.
pub struct ApiClient {
    tokens: Arc<TokenStore>,
    transport: BoxedHttpTransport,
    base_url: String,
    wait_for_token: bool,
}

impl ApiClient {
    /// Creates a client over the given transport, with an empty credential
    /// store and the default base URL.
    pub fn new(transport: BoxedHttpTransport) -> Self {
        Self {
            tokens: Arc::new(TokenStore::new()),
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            wait_for_token: false,
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// When set, sends block until a token is initialized instead of
    /// failing with [`CredentialError::NotInitialized`].
    ///
    /// [`CredentialError::NotInitialized`]: crate::CredentialError::NotInitialized
    pub fn wait_for_token(mut self, wait: bool) -> Self {
        self.wait_for_token = wait;
        self
    }

    /// The credential store this client reads its token from.
    pub fn token_store(&self) -> Arc<TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Sends a message and returns the platform's receipt.
    pub async fn send(&self, message: &OutboundMessage) -> SendResult<SendReceipt> {
        let token = self.token().await?;
        let content_key = message
            .content_type
            .content_key()
            .ok_or(SendError::UnsupportedContentType(message.content_type))?;
        check_recipients(message)?;

        let endpoint = if message.batch { BATCH_SEND } else { SEND };
        debug!(endpoint, content_type = %message.content_type, "sending message");

        let request = HttpRequest::post_json(
            self.endpoint_url(endpoint),
            build_payload(message, content_key),
        )
        .query("token", token.as_ref());
        let response = self.transport.send(request).await?;
        into_receipt(response)
    }

    /// Sends a plain text message to one recipient.
    pub async fn send_text(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::text(recv_id, recv_type, body)).await
    }

    /// Sends a markdown message.
    pub async fn send_markdown(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::markdown(recv_id, recv_type, body)).await
    }

    /// Sends an HTML message.
    pub async fn send_html(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::html(recv_id, recv_type, body)).await
    }

    /// Sends an image by its upload key.
    pub async fn send_image(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::image(recv_id, recv_type, key)).await
    }

    /// Sends a video by its upload key.
    pub async fn send_video(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::video(recv_id, recv_type, key)).await
    }

    /// Sends a file by its upload key.
    pub async fn send_file(
        &self,
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> SendResult<SendReceipt> {
        self.send(&OutboundMessage::file(recv_id, recv_type, key)).await
    }

    /// Streams a message to one recipient, chunk by chunk.
    ///
    /// The platform renders the message incrementally as chunks arrive.
    /// Only [`Text`](ContentKind::Text) and [`Markdown`](ContentKind::Markdown)
    /// can be streamed.
    pub async fn send_stream<S>(
        &self,
        recv_id: impl Into<String>,
        recv_type: RecipientKind,
        content_type: ContentKind,
        chunks: S,
    ) -> SendResult<SendReceipt>
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let token = self.token().await?;
        if !matches!(content_type, ContentKind::Text | ContentKind::Markdown) {
            return Err(SendError::UnsupportedContentType(content_type));
        }

        debug!(content_type = %content_type, "streaming message");

        let body: ByteStream = chunks.map(|chunk| Ok(chunk.into_bytes())).boxed();
        let request = HttpRequest::post_stream(self.endpoint_url(STREAM_SEND), body)
            .query("token", token.as_ref())
            .query("recvId", recv_id)
            .query("recvType", recv_type.as_str())
            .query("contentType", content_type.as_str())
            .header("Content-Type", "text/plain");
        let response = self.transport.send(request).await?;
        into_receipt(response)
    }

    async fn token(&self) -> CredentialResult<Arc<str>> {
        if self.wait_for_token {
            Ok(self.tokens.wait().await)
        } else {
            self.tokens.get()
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("wait_for_token", &self.wait_for_token)
            .field("token_initialized", &self.tokens.is_initialized())
            .finish()
    }
}

fn check_recipients(message: &OutboundMessage) -> SendResult<()> {
    match (&message.recv_id, message.batch) {
        (RecvId::Many(ids), true) if ids.is_empty() => Err(SendError::InvalidRecipients(
            "batch sends require at least one recipient",
        )),
        (RecvId::One(_), true) => Err(SendError::InvalidRecipients(
            "batch sends require a recipient list",
        )),
        (RecvId::Many(_), false) => Err(SendError::InvalidRecipients(
            "recipient lists are only accepted by batch sends",
        )),
        _ => Ok(()),
    }
}

fn build_payload(message: &OutboundMessage, content_key: &str) -> Value {
    let mut content = Map::new();
    content.insert(
        content_key.to_string(),
        Value::String(message.content.clone()),
    );
    if let Some(buttons) = &message.buttons {
        content.insert("button".to_string(), buttons.clone());
    }

    let recv_id = match &message.recv_id {
        RecvId::One(id) => Value::String(id.clone()),
        RecvId::Many(ids) => Value::Array(ids.iter().cloned().map(Value::String).collect()),
    };

    let mut payload = Map::new();
    payload.insert("recvId".to_string(), recv_id);
    payload.insert(
        "recvType".to_string(),
        Value::String(message.recv_type.as_str().to_string()),
    );
    payload.insert(
        "contentType".to_string(),
        Value::String(message.content_type.as_str().to_string()),
    );
    payload.insert("content".to_string(), Value::Object(content));
    if let Some(parent_id) = &message.parent_id {
        payload.insert("parentId".to_string(), Value::String(parent_id.clone()));
    }
    Value::Object(payload)
}

fn into_receipt(response: HttpResponse) -> SendResult<SendReceipt> {
    let body = response
        .into_json()
        .ok_or_else(|| SendError::MalformedResponse("response body is not JSON".to_string()))?;
    SendReceipt::from_response(body)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::stream;
    use parking_lot::Mutex;
    use serde_json::json;
    use yunhu_core::{HttpTransport, RequestBody, ResponseBody, TransportResult};

    use crate::error::CredentialError;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Recorded {
        url: String,
        query: Vec<(String, String)>,
        headers: Vec<(String, String)>,
        body: Value,
        streamed: Option<String>,
    }

    struct MockTransport {
        calls: Mutex<Vec<Recorded>>,
        response: ResponseBody,
    }

    impl MockTransport {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: ResponseBody::Json(response),
            })
        }

        fn plain_text(body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: ResponseBody::Text(body.to_string()),
            })
        }

        fn ok() -> Arc<Self> {
            Self::new(json!({
                "code": 0,
                "msg": "success",
                "data": {
                    "messageInfo": { "msgId": "M1", "recvId": "U1", "recvType": "user" }
                }
            }))
        }

        fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
            let (body, streamed) = match request.body {
                RequestBody::Json(value) => (value, None),
                RequestBody::Stream(mut chunks) => {
                    let mut text = String::new();
                    while let Some(chunk) = chunks.next().await {
                        text.push_str(&String::from_utf8(chunk.unwrap()).unwrap());
                    }
                    (Value::Null, Some(text))
                }
                RequestBody::Empty => (Value::Null, None),
            };
            self.calls.lock().push(Recorded {
                url: request.url,
                query: request.query,
                headers: request.headers,
                body,
                streamed,
            });
            let content_type = match &self.response {
                ResponseBody::Json(_) => "application/json",
                ResponseBody::Text(_) => "text/plain",
                ResponseBody::Bytes(_) => "application/octet-stream",
            };
            Ok(HttpResponse {
                status: 200,
                content_type: Some(content_type.to_string()),
                body: self.response.clone(),
            })
        }
    }

    fn ready_client(transport: Arc<MockTransport>) -> ApiClient {
        let client = ApiClient::new(transport);
        client.token_store().init("tok-1").unwrap();
        client
    }

    #[tokio::test]
    async fn text_sends_carry_the_token_and_text_key() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let receipt = client
            .send_text("U1", RecipientKind::User, "hi")
            .await
            .unwrap();
        assert!(receipt.success());
        assert_eq!(receipt.message_id(), Some("M1"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].url,
            "https://chat-go.jwzhd.com/open-apis/v1/bot/send"
        );
        assert_eq!(
            calls[0].query,
            vec![("token".to_string(), "tok-1".to_string())]
        );
        assert_eq!(
            calls[0].body,
            json!({
                "recvId": "U1",
                "recvType": "user",
                "contentType": "text",
                "content": { "text": "hi" },
            })
        );
    }

    #[tokio::test]
    async fn each_content_type_uses_its_wire_key() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let messages = [
            (OutboundMessage::markdown("U1", RecipientKind::User, "**hi**"), "markdown", "text"),
            (OutboundMessage::html("U1", RecipientKind::User, "<b>hi</b>"), "html", "text"),
            (OutboundMessage::image("U1", RecipientKind::User, "key-1"), "image", "imageKey"),
            (OutboundMessage::video("U1", RecipientKind::User, "key-2"), "video", "videoKey"),
            (OutboundMessage::file("U1", RecipientKind::User, "key-3"), "file", "fileKey"),
        ];
        for (message, _, _) in &messages {
            client.send(message).await.unwrap();
        }

        let calls = transport.calls();
        assert_eq!(calls.len(), messages.len());
        for (call, (message, wire_type, wire_key)) in calls.iter().zip(&messages) {
            assert_eq!(call.body["contentType"], json!(wire_type));
            assert_eq!(call.body["content"][wire_key], json!(message.content));
        }
    }

    #[tokio::test]
    async fn batch_sends_use_the_batch_endpoint() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let message = OutboundMessage::text(vec!["U1", "U2"], RecipientKind::User, "hi").batch();
        client.send(&message).await.unwrap();

        let calls = transport.calls();
        assert_eq!(
            calls[0].url,
            "https://chat-go.jwzhd.com/open-apis/v1/bot/batch_send"
        );
        assert_eq!(calls[0].body["recvId"], json!(["U1", "U2"]));
    }

    #[tokio::test]
    async fn batch_without_a_recipient_list_fails_before_transport() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let message = OutboundMessage::text("U1", RecipientKind::User, "hi").batch();
        let err = client.send(&message).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidRecipients(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_lists_are_rejected() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let message =
            OutboundMessage::text(Vec::<String>::new(), RecipientKind::User, "hi").batch();
        let err = client.send(&message).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidRecipients(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn recipient_lists_require_batch() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let message = OutboundMessage::text(vec!["U1", "U2"], RecipientKind::User, "hi");
        let err = client.send(&message).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidRecipients(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn form_messages_cannot_be_sent() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let message = OutboundMessage::new("U1", RecipientKind::User, ContentKind::Form, "{}");
        let err = client.send(&message).await.unwrap_err();
        assert!(matches!(
            err,
            SendError::UnsupportedContentType(ContentKind::Form)
        ));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn buttons_and_parent_are_omitted_unless_set() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let bare = OutboundMessage::text("U1", RecipientKind::User, "hi");
        client.send(&bare).await.unwrap();

        let decorated = OutboundMessage::text("U1", RecipientKind::User, "hi")
            .buttons(json!([{ "text": "ok", "actionType": 1 }]))
            .parent("M9");
        client.send(&decorated).await.unwrap();

        let calls = transport.calls();
        assert!(calls[0].body.get("parentId").is_none());
        assert!(calls[0].body["content"].get("button").is_none());
        assert_eq!(
            calls[1].body["content"]["button"],
            json!([{ "text": "ok", "actionType": 1 }])
        );
        assert_eq!(calls[1].body["parentId"], json!("M9"));
    }

    #[tokio::test]
    async fn missing_token_fails_without_touching_transport() {
        let transport = MockTransport::ok();
        let client = ApiClient::new(transport.clone());

        let err = client
            .send_text("U1", RecipientKind::User, "hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::Credential(CredentialError::NotInitialized)
        ));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn waiting_clients_send_once_the_token_arrives() {
        let transport = MockTransport::ok();
        let client = ApiClient::new(transport.clone()).wait_for_token(true);

        let store = client.token_store();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.init("tok-late").unwrap();
        });

        let receipt = client
            .send_text("U1", RecipientKind::User, "hi")
            .await
            .unwrap();
        assert!(receipt.success());
        assert_eq!(
            transport.calls()[0].query,
            vec![("token".to_string(), "tok-late".to_string())]
        );
    }

    #[tokio::test]
    async fn custom_base_urls_are_respected() {
        let transport = MockTransport::ok();
        let client = ApiClient::new(transport.clone()).with_base_url("https://example.test/api");
        client.token_store().init("tok-1").unwrap();

        client.send_text("U1", RecipientKind::User, "hi").await.unwrap();
        assert_eq!(transport.calls()[0].url, "https://example.test/api/send");
    }

    #[tokio::test]
    async fn non_json_responses_are_malformed() {
        let transport = MockTransport::plain_text("gateway timeout");
        let client = ready_client(transport);

        let err = client
            .send_text("U1", RecipientKind::User, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn stream_sends_carry_params_in_the_query() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let chunks = stream::iter(vec!["Hello, ".to_string(), "world".to_string()]);
        let receipt = client
            .send_stream("U1", RecipientKind::User, ContentKind::Markdown, chunks)
            .await
            .unwrap();
        assert!(receipt.success());

        let calls = transport.calls();
        assert_eq!(
            calls[0].url,
            "https://chat-go.jwzhd.com/open-apis/v1/bot/send-stream"
        );
        assert_eq!(
            calls[0].query,
            vec![
                ("token".to_string(), "tok-1".to_string()),
                ("recvId".to_string(), "U1".to_string()),
                ("recvType".to_string(), "user".to_string()),
                ("contentType".to_string(), "markdown".to_string()),
            ]
        );
        assert_eq!(
            calls[0].headers,
            vec![("Content-Type".to_string(), "text/plain".to_string())]
        );
        assert_eq!(calls[0].streamed.as_deref(), Some("Hello, world"));
    }

    #[tokio::test]
    async fn only_text_family_kinds_can_stream() {
        let transport = MockTransport::ok();
        let client = ready_client(transport.clone());

        let chunks = stream::iter(Vec::<String>::new());
        let err = client
            .send_stream("U1", RecipientKind::User, ContentKind::Image, chunks)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::UnsupportedContentType(ContentKind::Image)
        ));
        assert!(transport.calls().is_empty());
    }
}
