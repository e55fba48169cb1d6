//! Payload extraction and normalization.
//!
//! A message body is first reduced to a [`RawPayload`], then decoded into a
//! [`NormalizedPayload`] under exactly one [`Encoding`]. Detection order:
//!
//! 1. bytes are used as-is
//! 2. even-length hex text is hex-decoded
//! 3. base64-alphabet text is base64-decoded
//! 4. any other text is taken as UTF-8
//! 5. `{"type": "Buffer", "data": [..]}` is rebuilt from the byte array
//!
//! Hex must be tried before base64: every even-length hex string is also
//! valid base64 text.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::types::{Payload, BUFFER_TYPE_TAG};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::{Map, Value};

/// Field of an object payload that carries the actual data.
pub const DATA_FIELD: &str = "data";

/// Decoder matching the tolerant behaviour senders rely on: no padding
/// required, stray low bits accepted.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Message body reduced to one of the shapes the normalizer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    Binary(Vec<u8>),
    Text(String),
    SerializedBuffer(Vec<u8>),
}

/// How a payload was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Hex,
    Base64,
    Utf8,
    SerializedBuffer,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Binary => "binary",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
            Encoding::Utf8 => "utf-8",
            Encoding::SerializedBuffer => "serialized buffer",
        };
        f.write_str(name)
    }
}

/// Decoded payload bytes. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl NormalizedPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex rendering, for logs.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Padded base64 rendering, for logs.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl RawPayload {
    /// Pick the data out of a message body.
    ///
    /// An object with a `data` field that is neither null nor an empty string
    /// contributes that field, unless the object is itself a serialized
    /// buffer.
    pub fn extract(payload: &Payload) -> PipelineResult<Self> {
        match payload {
            Payload::Binary(bytes) => Ok(RawPayload::Binary(bytes.clone())),
            Payload::Json(value) => {
                let inner = match value {
                    Value::Object(map) if !is_buffer_descriptor(map) => map
                        .get(DATA_FIELD)
                        .filter(|data| !data.is_null() && data.as_str() != Some(""))
                        .unwrap_or(value),
                    _ => value,
                };
                Self::from_json(inner)
            }
        }
    }

    /// Classify a JSON value.
    pub fn from_json(value: &Value) -> PipelineResult<Self> {
        match value {
            Value::String(text) => Ok(RawPayload::Text(text.clone())),
            Value::Object(map) if is_buffer_descriptor(map) => {
                buffer_bytes(map).map(RawPayload::SerializedBuffer)
            }
            other => Err(PipelineError::UnsupportedPayloadFormat(
                json_kind(other).to_string(),
            )),
        }
    }

    /// Decode into bytes. First matching rule wins.
    pub fn normalize(self) -> PipelineResult<NormalizedPayload> {
        let (bytes, encoding) = match self {
            RawPayload::Binary(bytes) => (bytes, Encoding::Binary),
            RawPayload::Text(text) if is_hex(&text) => (
                hex::decode(&text).map_err(|e| PipelineError::PayloadDecode(e.to_string()))?,
                Encoding::Hex,
            ),
            RawPayload::Text(text) if is_base64(&text) => {
                (decode_base64(&text)?, Encoding::Base64)
            }
            RawPayload::Text(text) => (text.into_bytes(), Encoding::Utf8),
            RawPayload::SerializedBuffer(bytes) => (bytes, Encoding::SerializedBuffer),
        };
        Ok(NormalizedPayload { bytes, encoding })
    }
}

/// Extract and normalize in one step.
pub fn normalize(payload: &Payload) -> PipelineResult<NormalizedPayload> {
    RawPayload::extract(payload)?.normalize()
}

/// One or more hex digits, even length.
pub fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// One or more characters from the base64 alphabet, `=` included.
pub fn is_base64(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

// Decoding stops at the first `=`; a lone trailing character cannot form a
// byte and is dropped.
fn decode_base64(text: &str) -> PipelineResult<Vec<u8>> {
    let body = text.split('=').next().unwrap_or_default();
    let usable = if body.len() % 4 == 1 {
        &body[..body.len() - 1]
    } else {
        body
    };
    LENIENT_BASE64
        .decode(usable)
        .map_err(|e| PipelineError::PayloadDecode(e.to_string()))
}

fn is_buffer_descriptor(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some(BUFFER_TYPE_TAG)
}

fn buffer_bytes(map: &Map<String, Value>) -> PipelineResult<Vec<u8>> {
    let items = map
        .get(DATA_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PipelineError::PayloadDecode("serialized buffer has no data array".to_string())
        })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| {
                    PipelineError::PayloadDecode(format!(
                        "serialized buffer element {} is not a byte: {}",
                        i, item
                    ))
                })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
