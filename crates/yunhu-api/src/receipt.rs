//! Send receipts.
//!
//! The platform acknowledges every send with a JSON body carrying a status
//! code, a human-readable message, and (on success) the id the message was
//! assigned. [`SendReceipt`] keeps the raw body and reads the well-known
//! fields through fixed pointers, so unknown fields survive a round trip.

use serde_json::Value;
use yunhu_core::RecipientKind;

use crate::error::{SendError, SendResult};

const CODE: &str = "/code";
const MESSAGE: &str = "/msg";
const MESSAGE_ID: &str = "/data/messageInfo/msgId";
const RECIPIENT_ID: &str = "/data/messageInfo/recvId";
const RECIPIENT_TYPE: &str = "/data/messageInfo/recvType";

/// The platform's response to a send request.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    raw: Value,
}

impl SendReceipt {
    /// Wraps a response body, requiring at least an integer status code.
    pub fn from_response(raw: Value) -> SendResult<Self> {
        if raw.pointer(CODE).and_then(Value::as_i64).is_none() {
            return Err(SendError::MalformedResponse(
                "response carries no integer code".to_string(),
            ));
        }
        Ok(Self { raw })
    }

    /// Platform status code; zero means success.
    pub fn code(&self) -> i64 {
        self.raw.pointer(CODE).and_then(Value::as_i64).unwrap_or(-1)
    }

    /// Whether the platform accepted the message.
    pub fn success(&self) -> bool {
        self.code() == 0
    }

    /// Human-readable status message, if present.
    pub fn message(&self) -> Option<&str> {
        self.raw.pointer(MESSAGE).and_then(Value::as_str)
    }

    /// Id assigned to the sent message, if present.
    pub fn message_id(&self) -> Option<&str> {
        self.raw.pointer(MESSAGE_ID).and_then(Value::as_str)
    }

    /// Recipient id echoed back by the platform, if present.
    pub fn recipient_id(&self) -> Option<&str> {
        self.raw.pointer(RECIPIENT_ID).and_then(Value::as_str)
    }

    /// Recipient kind echoed back by the platform, if present and known.
    pub fn recipient_type(&self) -> Option<RecipientKind> {
        self.raw
            .pointer(RECIPIENT_TYPE)
            .and_then(Value::as_str)
            .and_then(RecipientKind::parse)
    }

    /// The full response body.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consumes the receipt, returning the full response body.
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_the_well_known_fields() {
        let receipt = SendReceipt::from_response(json!({
            "code": 0,
            "msg": "success",
            "data": {
                "messageInfo": {
                    "msgId": "M42",
                    "recvId": "U1",
                    "recvType": "user",
                }
            }
        }))
        .unwrap();

        assert!(receipt.success());
        assert_eq!(receipt.code(), 0);
        assert_eq!(receipt.message(), Some("success"));
        assert_eq!(receipt.message_id(), Some("M42"));
        assert_eq!(receipt.recipient_id(), Some("U1"));
        assert_eq!(receipt.recipient_type(), Some(RecipientKind::User));
    }

    #[test]
    fn tolerates_missing_detail_fields() {
        let receipt = SendReceipt::from_response(json!({ "code": 1 })).unwrap();
        assert!(!receipt.success());
        assert_eq!(receipt.message(), None);
        assert_eq!(receipt.message_id(), None);
        assert_eq!(receipt.recipient_type(), None);
    }

    #[test]
    fn rejects_bodies_without_a_code() {
        let err = SendReceipt::from_response(json!({ "msg": "?" })).unwrap_err();
        assert!(matches!(err, SendError::MalformedResponse(_)));

        let err = SendReceipt::from_response(json!({ "code": "0" })).unwrap_err();
        assert!(matches!(err, SendError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_fields_survive() {
        let body = json!({ "code": 0, "extra": { "a": 1 } });
        let receipt = SendReceipt::from_response(body.clone()).unwrap();
        assert_eq!(receipt.raw(), &body);
        assert_eq!(receipt.into_raw(), body);
    }
}
