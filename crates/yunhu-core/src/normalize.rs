//! Raw payload normalization.
//!
//! Webhook payloads are heterogeneous: message events nest their content
//! under `event.message`, system notifications may carry no `event` object
//! at all, and the "who to reply to" identity lives in different places for
//! direct and group chats. [`normalize`] flattens all of that into one
//! [`Event`] shape with stable field names.
//!
//! Field access goes through JSON-pointer lookups against a fixed path
//! table. A missing or mistyped field at any depth degrades to `None`; the
//! only failure mode is an absent or unrecognized `header.eventType`.

use serde_json::Value;

use crate::error::{PayloadError, PayloadResult};
use crate::event::{ContentKind, Event, EventKind, MessageBody, RecipientKind};

const EVENT_TYPE: &str = "/header/eventType";
const CONTENT_TYPE: &str = "/event/message/contentType";
const COMMAND_NAME: &str = "/event/message/commandName";
const COMMAND_ID: &str = "/event/message/commandId";
const SENDER_ID: &str = "/event/sender/senderId";
const SENDER_TYPE: &str = "/event/sender/senderType";
const SENDER_LEVEL: &str = "/event/sender/senderUserLevel";
const SENDER_NICK: &str = "/event/sender/senderNickName";
const CHAT_ID: &str = "/event/chat/chatId";
const CHAT_TYPE: &str = "/event/chat/chatType";

/// Normalizes a raw webhook payload into an [`Event`].
///
/// Fails only when `header.eventType` is absent or names an event type this
/// SDK does not know. Everything else is best-effort: fields that are
/// missing, or present with an unexpected JSON type, end up as `None` on the
/// event. The input payload is retained on the event for callers that need
/// platform fields outside the canonical shape.
pub fn normalize(payload: &Value) -> PayloadResult<Event> {
    let kind: EventKind = str_at(payload, EVENT_TYPE)
        .ok_or(PayloadError::MissingEventType)?
        .parse()?;

    let content_type = match kind {
        EventKind::Message | EventKind::Instruction => {
            str_at(payload, CONTENT_TYPE).and_then(ContentKind::parse)
        }
        _ => None,
    };
    let body = content_type.and_then(|kind| body_at(payload, kind));

    let (sender_id, sender_type) = routing_identity(payload);

    let (command, command_id) = if kind == EventKind::Instruction {
        (string_at(payload, COMMAND_NAME), int_at(payload, COMMAND_ID))
    } else {
        (None, None)
    };

    Ok(Event {
        kind,
        content_type,
        sender_id,
        sender_type,
        body,
        command,
        command_id,
        sender_level: string_at(payload, SENDER_LEVEL),
        sender_nick: string_at(payload, SENDER_NICK),
        raw: payload.clone(),
    })
}

/// Resolves the recipient-routing identity of a payload.
///
/// The platform encodes "who to reply to" differently per chat context:
/// in a direct bot chat (`chatType == "bot"`) replies go to the sender as a
/// user; in any other chat context they go to the chat itself. Payloads
/// without a chat object fall back to the sender's own id and type.
fn routing_identity(payload: &Value) -> (Option<String>, Option<RecipientKind>) {
    match str_at(payload, CHAT_TYPE) {
        Some("bot") => (id_at(payload, SENDER_ID), Some(RecipientKind::User)),
        Some(other) => (id_at(payload, CHAT_ID), RecipientKind::parse(other)),
        None => (
            id_at(payload, SENDER_ID),
            str_at(payload, SENDER_TYPE).and_then(RecipientKind::parse),
        ),
    }
}

/// Resolves the message body for a content kind, per the body table:
/// text-family kinds read `content.text`, media kinds read
/// `content.<type>Url`, form reads the `content.formJson` object.
fn body_at(payload: &Value, kind: ContentKind) -> Option<MessageBody> {
    let value = payload.pointer(kind.body_pointer())?;
    match kind {
        ContentKind::Text | ContentKind::Markdown | ContentKind::Html => {
            Some(MessageBody::Text(value.as_str()?.to_string()))
        }
        ContentKind::Image | ContentKind::Video | ContentKind::File => {
            Some(MessageBody::Url(value.as_str()?.to_string()))
        }
        ContentKind::Form => Some(MessageBody::Form(value.clone())),
    }
}

fn str_at<'a>(payload: &'a Value, path: &str) -> Option<&'a str> {
    payload.pointer(path)?.as_str()
}

fn string_at(payload: &Value, path: &str) -> Option<String> {
    str_at(payload, path).map(str::to_string)
}

/// Reads an id field. The platform documents ids as strings but numeric
/// values show up in the wild; both are accepted.
fn id_at(payload: &Value, path: &str) -> Option<String> {
    match payload.pointer(path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an integer field, tolerating numeric strings.
fn int_at(payload: &Value, path: &str) -> Option<i64> {
    match payload.pointer(path)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn group_text_message() -> Value {
        json!({
            "header": { "eventType": "message.receive.normal" },
            "event": {
                "sender": {
                    "senderId": "U1",
                    "senderType": "user",
                    "senderUserLevel": "member",
                    "senderNickName": "nick"
                },
                "chat": { "chatId": "G9", "chatType": "group" },
                "message": {
                    "contentType": "text",
                    "content": { "text": "hello" }
                }
            }
        })
    }

    #[test]
    fn normalizes_a_group_text_message() {
        let event = normalize(&group_text_message()).unwrap();
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.content_type, Some(ContentKind::Text));
        assert_eq!(event.body, Some(MessageBody::Text("hello".to_string())));
        assert_eq!(event.sender_id.as_deref(), Some("G9"));
        assert_eq!(event.sender_type, Some(RecipientKind::Group));
        assert_eq!(event.sender_level.as_deref(), Some("member"));
        assert_eq!(event.sender_nick.as_deref(), Some("nick"));
        assert_eq!(event.command, None);
        assert_eq!(event.command_id, None);
    }

    #[test]
    fn direct_bot_chat_routes_to_the_sender_as_user() {
        let mut payload = group_text_message();
        payload["event"]["chat"] = json!({ "chatId": "C3", "chatType": "bot" });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.sender_id.as_deref(), Some("U1"));
        assert_eq!(event.sender_type, Some(RecipientKind::User));
    }

    #[test]
    fn missing_chat_object_falls_back_to_the_sender() {
        let payload = json!({
            "header": { "eventType": "message.receive.normal" },
            "event": {
                "sender": { "senderId": "U1", "senderType": "user" },
                "message": { "contentType": "text", "content": { "text": "ping" } }
            }
        });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.content_type, Some(ContentKind::Text));
        assert_eq!(event.body_text(), Some("ping"));
        assert_eq!(event.sender_id.as_deref(), Some("U1"));
        assert_eq!(event.sender_type, Some(RecipientKind::User));
    }

    #[test]
    fn instruction_messages_carry_command_fields() {
        let payload = json!({
            "header": { "eventType": "message.receive.instruction" },
            "event": {
                "chat": { "chatId": "G9", "chatType": "group" },
                "message": {
                    "contentType": "text",
                    "content": { "text": "/roll" },
                    "commandName": "roll",
                    "commandId": 42
                }
            }
        });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.kind, EventKind::Instruction);
        assert_eq!(event.command.as_deref(), Some("roll"));
        assert_eq!(event.command_id, Some(42));
    }

    #[test]
    fn command_fields_are_ignored_outside_instructions() {
        let mut payload = group_text_message();
        payload["event"]["message"]["commandName"] = json!("roll");
        payload["event"]["message"]["commandId"] = json!(42);
        let event = normalize(&payload).unwrap();
        assert_eq!(event.command, None);
        assert_eq!(event.command_id, None);
    }

    #[test]
    fn media_bodies_resolve_to_their_url_field() {
        for (kind, key) in [
            (ContentKind::Image, "imageUrl"),
            (ContentKind::Video, "videoUrl"),
            (ContentKind::File, "fileUrl"),
        ] {
            let mut payload = group_text_message();
            payload["event"]["message"] = json!({
                "contentType": kind.as_str(),
                "content": { key: "https://example.com/blob" }
            });
            let event = normalize(&payload).unwrap();
            assert_eq!(event.content_type, Some(kind));
            assert_eq!(
                event.body,
                Some(MessageBody::Url("https://example.com/blob".to_string()))
            );
        }
    }

    #[test]
    fn form_bodies_keep_the_submitted_object() {
        let mut payload = group_text_message();
        payload["event"]["message"] = json!({
            "contentType": "form",
            "content": { "formJson": { "field": "value" } }
        });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.content_type, Some(ContentKind::Form));
        assert_eq!(
            event.body,
            Some(MessageBody::Form(json!({ "field": "value" })))
        );
    }

    #[test]
    fn unknown_content_type_keeps_normalizing_without_a_body() {
        let mut payload = group_text_message();
        payload["event"]["message"]["contentType"] = json!("sticker");
        let event = normalize(&payload).unwrap();
        assert_eq!(event.content_type, None);
        assert_eq!(event.body, None);
    }

    #[test]
    fn non_message_kinds_skip_content_resolution() {
        let payload = json!({
            "header": { "eventType": "group.join" },
            "event": {
                "sender": { "senderId": "U1", "senderType": "user" },
                "chat": { "chatId": "G9", "chatType": "group" },
                "message": { "contentType": "text", "content": { "text": "x" } }
            }
        });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.kind, EventKind::Join);
        assert_eq!(event.content_type, None);
        assert_eq!(event.body, None);
        assert_eq!(event.sender_id.as_deref(), Some("G9"));
    }

    #[test]
    fn system_ping_without_event_object_populates_only_the_kind() {
        let payload = json!({ "header": { "eventType": "bot.settings" } });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.kind, EventKind::Setting);
        assert_eq!(event.content_type, None);
        assert_eq!(event.body, None);
        assert_eq!(event.sender_id, None);
        assert_eq!(event.sender_type, None);
        assert_eq!(event.sender_level, None);
        assert_eq!(event.sender_nick, None);
    }

    #[test]
    fn missing_event_type_is_rejected() {
        assert_eq!(
            normalize(&json!({ "header": {} })),
            Err(PayloadError::MissingEventType)
        );
        assert_eq!(normalize(&json!(null)), Err(PayloadError::MissingEventType));
        assert_eq!(normalize(&json!("str")), Err(PayloadError::MissingEventType));
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let payload = json!({ "header": { "eventType": "message.receive.exotic" } });
        assert_eq!(
            normalize(&payload),
            Err(PayloadError::UnknownEventType(
                "message.receive.exotic".to_string()
            ))
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let payload = group_text_message();
        assert_eq!(normalize(&payload).unwrap(), normalize(&payload).unwrap());
    }

    #[test]
    fn degrades_instead_of_failing_on_mangled_payloads() {
        // Every nested field mistyped or truncated; only the event type is intact.
        let mangled = [
            json!({ "header": { "eventType": "message.receive.normal" }, "event": null }),
            json!({ "header": { "eventType": "message.receive.normal" }, "event": "not-an-object" }),
            json!({
                "header": { "eventType": "message.receive.normal" },
                "event": { "message": { "contentType": 7 } }
            }),
            json!({
                "header": { "eventType": "message.receive.normal" },
                "event": { "message": { "contentType": "text", "content": { "text": 11 } } }
            }),
            json!({
                "header": { "eventType": "message.receive.normal" },
                "event": { "chat": { "chatType": "group" }, "sender": 4 }
            }),
            json!({
                "header": { "eventType": "message.receive.instruction" },
                "event": { "message": { "commandId": true } }
            }),
        ];
        for payload in &mangled {
            let event = normalize(payload).unwrap();
            assert_eq!(event.kind.as_str().parse::<EventKind>().unwrap(), event.kind);
            assert_eq!(event.body, None);
        }
    }

    #[test]
    fn numeric_ids_and_command_ids_are_tolerated() {
        let payload = json!({
            "header": { "eventType": "message.receive.instruction" },
            "event": {
                "chat": { "chatId": 90210, "chatType": "group" },
                "message": { "commandId": "42" }
            }
        });
        let event = normalize(&payload).unwrap();
        assert_eq!(event.sender_id.as_deref(), Some("90210"));
        assert_eq!(event.command_id, Some(42));
    }

    #[test]
    fn raw_payload_is_retained() {
        let payload = group_text_message();
        let event = normalize(&payload).unwrap();
        assert_eq!(event.raw(), &payload);
    }
}
