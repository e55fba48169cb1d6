//! Core message types
//!
//! [`Message`] is the unit that flows into and out of a node. Only the fields
//! the node reads or writes are typed; everything else rides along in
//! [`Message::extra`] and is written back unchanged.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker value of the `type` field of a serialized byte buffer.
pub const BUFFER_TYPE_TAG: &str = "Buffer";

/// A message passing through the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Destination multicast group, if the sender set one.
    #[serde(
        rename = "multicastGroupId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub multicast_group_id: Option<Value>,

    /// Application port, if the sender set one.
    #[serde(rename = "fPort", default, skip_serializing_if = "Option::is_none")]
    pub f_port: Option<Value>,

    /// Message body. Replaced by the outcome on output.
    #[serde(default)]
    pub payload: Payload,

    /// Failure detail, attached by the node when enqueueing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    /// Any other fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a message carrying the given payload.
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Set the top-level multicast group id.
    pub fn with_group_id(mut self, id: impl Into<Value>) -> Self {
        self.multicast_group_id = Some(id.into());
        self
    }

    /// Set the top-level port.
    pub fn with_f_port(mut self, f_port: impl Into<Value>) -> Self {
        self.f_port = Some(f_port.into());
        self
    }

    /// Parse a message from a JSON string.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Render the message as a single JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The outcome attached to this message, if the node has processed it.
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.payload {
            Payload::Json(value) => serde_json::from_value(value.clone()).ok(),
            Payload::Binary(_) => None,
        }
    }

    /// Attach an outcome, replacing the payload and setting or clearing `error`.
    pub fn attach_outcome(&mut self, outcome: &Outcome) {
        self.error = match outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(info) => Some(info.clone()),
        };
        self.payload = Payload::Json(outcome.to_payload());
    }
}

/// Message body: either raw bytes handed over by the host, or a JSON value.
///
/// Bytes serialize as `{"type": "Buffer", "data": [..]}` so that a message
/// written out and read back in still carries its binary body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Binary(Vec<u8>),
    Json(Value),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Json(Value::Null)
    }
}

impl Payload {
    /// The payload as a JSON object, if it is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of an object payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Binary(bytes.to_vec())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Json(Value::String(text.to_string()))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Json(Value::String(text))
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Json(value) => value.serialize(serializer),
            Payload::Binary(bytes) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", BUFFER_TYPE_TAG)?;
                map.serialize_entry("data", bytes)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Payload::Json)
    }
}

/// Error code carried in a failure: numeric gRPC status codes from the
/// server, symbolic codes for failures detected locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Grpc(i32),
    Local(String),
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Grpc(code) => write!(f, "{}", code),
            ErrorCode::Local(code) => write!(f, "{}", code),
        }
    }
}

/// Failure detail attached to a message as `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub code: ErrorCode,
    #[serde(default)]
    pub details: Option<String>,
}

/// Detail of a successful enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Frame counter assigned by the server.
    #[serde(rename = "fCnt")]
    pub f_cnt: u32,
    #[serde(rename = "multicastGroupId")]
    pub multicast_group_id: String,
    #[serde(rename = "fPort")]
    pub f_port: u32,
    /// RFC 3339 UTC time the response was received.
    pub timestamp: String,
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Delivery),
    Failure(ErrorInfo),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The `payload` value written to the outgoing message.
    pub fn to_payload(&self) -> Value {
        match self {
            Outcome::Success(delivery) => {
                let mut map = Map::new();
                map.insert("success".to_string(), Value::Bool(true));
                map.insert("fCnt".to_string(), Value::from(delivery.f_cnt));
                map.insert(
                    "multicastGroupId".to_string(),
                    Value::String(delivery.multicast_group_id.clone()),
                );
                map.insert("fPort".to_string(), Value::from(delivery.f_port));
                map.insert(
                    "timestamp".to_string(),
                    Value::String(delivery.timestamp.clone()),
                );
                Value::Object(map)
            }
            Outcome::Failure(info) => {
                let mut map = Map::new();
                map.insert("success".to_string(), Value::Bool(false));
                map.insert("error".to_string(), Value::String(info.message.clone()));
                Value::Object(map)
            }
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        match value.get("success").and_then(Value::as_bool) {
            Some(true) => serde_json::from_value(value)
                .map(Outcome::Success)
                .map_err(D::Error::custom),
            Some(false) => {
                let message = value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Outcome::Failure(ErrorInfo {
                    message,
                    code: ErrorCode::Local(String::new()),
                    details: None,
                }))
            }
            None => Err(D::Error::custom("missing `success` flag")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_preserves_extra_fields() {
        let msg = Message::from_json(r#"{"topic":"downlink","_msgid":"abc","payload":"0a0b"}"#)
            .unwrap();
        assert_eq!(msg.extra.get("topic"), Some(&json!("downlink")));
        assert_eq!(msg.payload, Payload::Json(json!("0a0b")));

        let out: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(out["topic"], "downlink");
        assert_eq!(out["_msgid"], "abc");
        assert!(out.get("multicastGroupId").is_none());
    }

    #[test]
    fn test_binary_payload_serializes_as_buffer() {
        let msg = Message::new(vec![1u8, 2, 255]);
        let out: Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(out["payload"], json!({"type": "Buffer", "data": [1, 2, 255]}));
    }

    #[test]
    fn test_attach_success_clears_error() {
        let mut msg = Message::new("00");
        msg.error = Some(ErrorInfo {
            message: "old".into(),
            code: ErrorCode::Grpc(2),
            details: None,
        });
        let outcome = Outcome::Success(Delivery {
            f_cnt: 7,
            multicast_group_id: "grp".into(),
            f_port: 10,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        });
        msg.attach_outcome(&outcome);

        assert!(msg.error.is_none());
        assert_eq!(msg.payload.field("fCnt"), Some(&json!(7)));
        assert_eq!(msg.outcome(), Some(outcome));
    }

    #[test]
    fn test_attach_failure() {
        let mut msg = Message::new("00");
        let info = ErrorInfo {
            message: "unavailable".into(),
            code: ErrorCode::Grpc(14),
            details: Some("connection refused".into()),
        };
        msg.attach_outcome(&Outcome::Failure(info.clone()));

        let out: Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(out["payload"], json!({"success": false, "error": "unavailable"}));
        assert_eq!(out["error"]["code"], json!(14));
        assert_eq!(msg.error, Some(info));
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(serde_json::to_value(ErrorCode::Grpc(14)).unwrap(), json!(14));
        assert_eq!(
            serde_json::to_value(ErrorCode::Local("MISSING_PARAMETER".into())).unwrap(),
            json!("MISSING_PARAMETER")
        );
        assert_eq!(ErrorCode::Grpc(3).to_string(), "3");
    }
}
