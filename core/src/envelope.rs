//! The uniform result of a completed exchange.
//!
//! # Design
//! Internally the payload is a tagged union: either the decoded JSON value
//! or the raw text of a body that failed to decode. Callers of the API see
//! the flattened shape instead, `{status, headers, ...payload}`, with the
//! payload's top-level fields spread next to `status` and `headers` (or a
//! single `message` field for the fallback). [`Envelope::to_value`] and the
//! `Serialize` impl produce that shape; [`Envelope::data`] deserializes it
//! into a caller type.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codec::{self, Decoded};
use crate::http::HttpResponse;

/// Decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Decoded(Value),
    Fallback(String),
}

impl From<Decoded> for Payload {
    fn from(decoded: Decoded) -> Self {
        match decoded {
            Decoded::Structured(value) => Payload::Decoded(value),
            Decoded::Fallback(raw) => Payload::Fallback(raw),
        }
    }
}

/// Status, headers and payload of one response. Produced for both 2xx and
/// non-2xx outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub payload: Payload,
}

impl Envelope {
    /// Build an envelope from a raw exchange, decoding headers and body.
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: codec::parse_header_block(&response.header_block),
            payload: codec::decode_body(&response.body).into(),
        }
    }

    /// Whether the status counts as success: its leading decimal digit is 2.
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Look up a response header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `message` the caller would see at top level: the raw body for a
    /// fallback payload, or a string `message` field of a decoded object.
    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Fallback(raw) => Some(raw.as_str()),
            Payload::Decoded(Value::Object(map)) => map.get("message").and_then(Value::as_str),
            Payload::Decoded(_) => None,
        }
    }

    /// The flattened caller-visible shape.
    ///
    /// Payload fields are spread after `status` and `headers` and win on
    /// collision. Arrays spread under their indices and strings under the
    /// index of each character; other scalars add nothing. Characters are
    /// Unicode scalar values, so one outside the Basic Multilingual Plane
    /// takes a single index rather than two surrogate halves.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("status".to_string(), Value::from(self.status));
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        map.insert("headers".to_string(), Value::Object(headers));

        match &self.payload {
            Payload::Fallback(raw) => {
                map.insert("message".to_string(), Value::String(raw.clone()));
            }
            Payload::Decoded(Value::Object(fields)) => {
                for (k, v) in fields {
                    map.insert(k.clone(), v.clone());
                }
            }
            Payload::Decoded(Value::Array(items)) => {
                for (i, v) in items.iter().enumerate() {
                    map.insert(i.to_string(), v.clone());
                }
            }
            Payload::Decoded(Value::String(s)) => {
                for (i, c) in s.chars().enumerate() {
                    map.insert(i.to_string(), Value::String(c.to_string()));
                }
            }
            Payload::Decoded(_) => {}
        }
        Value::Object(map)
    }

    /// Deserialize the flattened shape into `T`. Response shapes are
    /// trusted; a mismatch surfaces as a `serde_json` error.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Leading-digit success test on a numeric status code.
///
/// For every three-digit code this is the same as `200..=299`.
pub fn is_success(status: u16) -> bool {
    let mut leading = status;
    while leading >= 10 {
        leading /= 10;
    }
    leading == 2
}
