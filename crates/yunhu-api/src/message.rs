//! Outbound message model.

use serde::Serialize;
use serde_json::Value;
use yunhu_core::{ContentKind, RecipientKind};

/// One recipient or a batch of them.
///
/// Serializes untagged: a single id becomes a JSON string, a batch becomes
/// an array, which is exactly what the `send` and `batch_send` endpoints
/// expect in their `recvId` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecvId {
    /// A single recipient id.
    One(String),
    /// A list of recipient ids, for batch sends.
    Many(Vec<String>),
}

impl RecvId {
    /// Returns the id list, if this is a batch.
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            RecvId::Many(ids) => Some(ids),
            RecvId::One(_) => None,
        }
    }
}

impl From<&str> for RecvId {
    fn from(id: &str) -> Self {
        RecvId::One(id.to_string())
    }
}

impl From<String> for RecvId {
    fn from(id: String) -> Self {
        RecvId::One(id)
    }
}

impl From<Vec<String>> for RecvId {
    fn from(ids: Vec<String>) -> Self {
        RecvId::Many(ids)
    }
}

impl From<Vec<&str>> for RecvId {
    fn from(ids: Vec<&str>) -> Self {
        RecvId::Many(ids.into_iter().map(str::to_string).collect())
    }
}

/// A message to send, before validation and payload building.
///
/// `content` is the body text for text-family kinds and the upload key for
/// media kinds. Optional fields are omitted from the wire payload entirely
/// when unset; the platform treats empty placeholders as values.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Recipient id(s).
    pub recv_id: RecvId,
    /// Whether the recipients are users or groups.
    pub recv_type: RecipientKind,
    /// Content type; must be one of the six sendable kinds.
    pub content_type: ContentKind,
    /// Body text or media upload key, per `content_type`.
    pub content: String,
    /// Inline button specification, attached under `content.button`.
    pub buttons: Option<Value>,
    /// Id of the message this one replies to.
    pub parent_id: Option<String>,
    /// Use the batch endpoint; requires `recv_id` to be a non-empty list.
    pub batch: bool,
}

impl OutboundMessage {
    /// Creates a message with the given content type.
    pub fn new(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        content_type: ContentKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            recv_id: recv_id.into(),
            recv_type,
            content_type,
            content: content.into(),
            buttons: None,
            parent_id: None,
            batch: false,
        }
    }

    /// A plain text message.
    pub fn text(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::Text, body)
    }

    /// A markdown message.
    pub fn markdown(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::Markdown, body)
    }

    /// An HTML message.
    pub fn html(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        body: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::Html, body)
    }

    /// An image message; `key` is the platform upload key.
    pub fn image(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::Image, key)
    }

    /// A video message; `key` is the platform upload key.
    pub fn video(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::Video, key)
    }

    /// A file message; `key` is the platform upload key.
    pub fn file(
        recv_id: impl Into<RecvId>,
        recv_type: RecipientKind,
        key: impl Into<String>,
    ) -> Self {
        Self::new(recv_id, recv_type, ContentKind::File, key)
    }

    /// Attaches an inline button specification.
    pub fn buttons(mut self, spec: Value) -> Self {
        self.buttons = Some(spec);
        self
    }

    /// Marks this message as a reply to `parent_id`.
    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Routes this message through the batch endpoint.
    pub fn batch(mut self) -> Self {
        self.batch = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn recv_id_serializes_untagged() {
        assert_eq!(
            serde_json::to_value(RecvId::from("U1")).unwrap(),
            json!("U1")
        );
        assert_eq!(
            serde_json::to_value(RecvId::from(vec!["U1", "U2"])).unwrap(),
            json!(["U1", "U2"])
        );
    }

    #[test]
    fn builders_fill_the_optional_fields() {
        let message = OutboundMessage::text("U1", RecipientKind::User, "hi")
            .buttons(json!([{ "text": "ok" }]))
            .parent("M9");
        assert_eq!(message.content_type, ContentKind::Text);
        assert_eq!(message.buttons, Some(json!([{ "text": "ok" }])));
        assert_eq!(message.parent_id.as_deref(), Some("M9"));
        assert!(!message.batch);

        let message =
            OutboundMessage::image(vec!["U1", "U2"], RecipientKind::User, "key-3").batch();
        assert!(message.batch);
        assert_eq!(message.recv_id.as_many().map(<[String]>::len), Some(2));
    }
}
