//! Canonical event model.
//!
//! The platform pushes one JSON payload per webhook call; its shape varies
//! by event kind and by message content type. This module defines the stable
//! shape every payload is normalized into:
//!
//! - [`EventKind`] - closed set of event types, mapped from `header.eventType`
//! - [`ContentKind`] - closed set of message content types
//! - [`RecipientKind`] - who a message can be routed to ("user" | "group")
//! - [`MessageBody`] - content-type-dependent message body
//! - [`Event`] - the canonical event handed to handlers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;

// ============================================================================
// Event Kind
// ============================================================================

/// Classification of inbound events.
///
/// Each variant corresponds to exactly one `header.eventType` string pushed
/// by the platform. Unknown strings fail normalization instead of mapping to
/// a catch-all variant, so a platform-side addition is noticed rather than
/// silently dropped into the wrong bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An ordinary chat message.
    Message,
    /// A message that invokes a bot instruction (slash command).
    Instruction,
    /// A user joined a group the bot is in.
    Join,
    /// A user left a group the bot is in.
    Leave,
    /// The bot's settings panel was changed.
    Setting,
    /// An inline button was pressed.
    Button,
    /// A bot shortcut menu entry was selected.
    Menu,
}

impl EventKind {
    /// Returns the wire-level `header.eventType` string for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message.receive.normal",
            EventKind::Instruction => "message.receive.instruction",
            EventKind::Join => "group.join",
            EventKind::Leave => "group.leave",
            EventKind::Setting => "bot.settings",
            EventKind::Button => "button.report.inline",
            EventKind::Menu => "bot.shortcut.menu",
        }
    }
}

impl FromStr for EventKind {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "message.receive.normal" => EventKind::Message,
            "message.receive.instruction" => EventKind::Instruction,
            "group.join" => EventKind::Join,
            "group.leave" => EventKind::Leave,
            "bot.settings" => EventKind::Setting,
            "button.report.inline" => EventKind::Button,
            "bot.shortcut.menu" => EventKind::Menu,
            other => return Err(PayloadError::UnknownEventType(other.to_string())),
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Content Kind
// ============================================================================

/// The kind of a message body.
///
/// Determines both where the body lives in an inbound payload and which
/// content-key the wire protocol expects when sending. `Form` only appears
/// inbound; it has no send content-key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Plain text.
    Text,
    /// Markdown-formatted text.
    Markdown,
    /// HTML-formatted text.
    Html,
    /// An image, referenced by URL inbound and by upload key outbound.
    Image,
    /// A video, referenced by URL inbound and by upload key outbound.
    Video,
    /// A file, referenced by URL inbound and by upload key outbound.
    File,
    /// A submitted settings form (inbound only).
    Form,
}

impl ContentKind {
    /// Returns the wire-level content-type string.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Markdown => "markdown",
            ContentKind::Html => "html",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::File => "file",
            ContentKind::Form => "form",
        }
    }

    /// Parses a wire-level content-type string. Unknown strings are `None`;
    /// inbound payloads with a content type this SDK does not know keep
    /// normalizing, they just carry no typed body.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "text" => ContentKind::Text,
            "markdown" => ContentKind::Markdown,
            "html" => ContentKind::Html,
            "image" => ContentKind::Image,
            "video" => ContentKind::Video,
            "file" => ContentKind::File,
            "form" => ContentKind::Form,
            _ => return None,
        })
    }

    /// Returns the key this kind's content is sent under in an outbound
    /// payload, or `None` for kinds that cannot be sent.
    pub fn content_key(self) -> Option<&'static str> {
        match self {
            ContentKind::Text | ContentKind::Markdown | ContentKind::Html => Some("text"),
            ContentKind::Image => Some("imageKey"),
            ContentKind::Video => Some("videoKey"),
            ContentKind::File => Some("fileKey"),
            ContentKind::Form => None,
        }
    }

    /// JSON-pointer path of this kind's body within an inbound payload.
    pub(crate) fn body_pointer(self) -> &'static str {
        match self {
            ContentKind::Text | ContentKind::Markdown | ContentKind::Html => {
                "/event/message/content/text"
            }
            ContentKind::Image => "/event/message/content/imageUrl",
            ContentKind::Video => "/event/message/content/videoUrl",
            ContentKind::File => "/event/message/content/fileUrl",
            ContentKind::Form => "/event/message/content/formJson",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Recipient Kind
// ============================================================================

/// Whether a message is routed to an individual user or to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    /// A direct chat with one user.
    User,
    /// A group chat.
    Group,
}

impl RecipientKind {
    /// Returns the wire-level `recvType` string.
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientKind::User => "user",
            RecipientKind::Group => "group",
        }
    }

    /// Parses a wire-level recipient-type string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(RecipientKind::User),
            "group" => Some(RecipientKind::Group),
            _ => None,
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Message Body
// ============================================================================

/// The body of a message, shaped by its [`ContentKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Text content (text, markdown and html kinds).
    Text(String),
    /// A download URL (image, video and file kinds).
    Url(String),
    /// The submitted form object (form kind).
    Form(Value),
}

impl MessageBody {
    /// Returns the text content, if this is a text-family body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageBody::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the download URL, if this is a media body.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            MessageBody::Url(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the form object, if this is a form body.
    pub fn as_form(&self) -> Option<&Value> {
        match self {
            MessageBody::Form(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// A normalized inbound event.
///
/// Every field except [`kind`](Self::kind) is optional: different event
/// kinds populate disjoint subsets of the payload tree, and the platform
/// does not contractually guarantee any nested field. Missing data degrades
/// to `None`; it never fails normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Message content type; populated for message and instruction kinds.
    pub content_type: Option<ContentKind>,
    /// Resolved recipient-routing id: who a reply should be addressed to.
    pub sender_id: Option<String>,
    /// Resolved recipient-routing type, paired with `sender_id`.
    pub sender_type: Option<RecipientKind>,
    /// The message body, resolved per content type.
    pub body: Option<MessageBody>,
    /// Instruction name; instruction kind only.
    pub command: Option<String>,
    /// Instruction id; instruction kind only.
    pub command_id: Option<i64>,
    /// Sender's user level, when the platform provides it.
    pub sender_level: Option<String>,
    /// Sender's nickname, when the platform provides it.
    pub sender_nick: Option<String>,
    pub(crate) raw: Value,
}

impl Event {
    /// Creates an event of the given kind with no message fields populated.
    ///
    /// Useful for tests and for synthetic events; real events come out of
    /// [`normalize`](crate::normalize).
    pub fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            content_type: None,
            sender_id: None,
            sender_type: None,
            body: None,
            command: None,
            command_id: None,
            sender_level: None,
            sender_nick: None,
            raw: Value::Null,
        }
    }

    /// The raw payload this event was normalized from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Shorthand for the text body, when there is one.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_ref().and_then(MessageBody::as_text)
    }

    /// The `(id, kind)` pair a reply to this event should be sent to, when
    /// the payload carried enough to resolve one.
    pub fn reply_target(&self) -> Option<(&str, RecipientKind)> {
        Some((self.sender_id.as_deref()?, self.sender_type?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_wire_strings() {
        let kinds = [
            EventKind::Message,
            EventKind::Instruction,
            EventKind::Join,
            EventKind::Leave,
            EventKind::Setting,
            EventKind::Button,
            EventKind::Menu,
        ];
        for kind in kinds {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_event_kind_is_an_error() {
        let err = "message.receive.weird".parse::<EventKind>().unwrap_err();
        assert_eq!(
            err,
            PayloadError::UnknownEventType("message.receive.weird".to_string())
        );
    }

    #[test]
    fn content_keys_follow_the_wire_table() {
        assert_eq!(ContentKind::Text.content_key(), Some("text"));
        assert_eq!(ContentKind::Markdown.content_key(), Some("text"));
        assert_eq!(ContentKind::Html.content_key(), Some("text"));
        assert_eq!(ContentKind::Image.content_key(), Some("imageKey"));
        assert_eq!(ContentKind::Video.content_key(), Some("videoKey"));
        assert_eq!(ContentKind::File.content_key(), Some("fileKey"));
        assert_eq!(ContentKind::Form.content_key(), None);
    }

    #[test]
    fn recipient_kind_parses_wire_strings() {
        assert_eq!(RecipientKind::parse("user"), Some(RecipientKind::User));
        assert_eq!(RecipientKind::parse("group"), Some(RecipientKind::Group));
        assert_eq!(RecipientKind::parse("bot"), None);
    }

    #[test]
    fn reply_target_needs_both_id_and_type() {
        let mut event = Event::bare(EventKind::Message);
        assert_eq!(event.reply_target(), None);

        event.sender_id = Some("U1".to_string());
        assert_eq!(event.reply_target(), None);

        event.sender_type = Some(RecipientKind::User);
        assert_eq!(event.reply_target(), Some(("U1", RecipientKind::User)));
    }
}
