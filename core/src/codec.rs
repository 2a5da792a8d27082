//! Pure encoding and decoding helpers used by the transport layer.
//!
//! Nothing in here touches the network or holds state: every function is
//! deterministic for a given input.

use std::collections::HashMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::http::{Query, QueryValue};

/// Characters left as-is in a query component. Everything else is
/// percent-encoded as UTF-8 bytes.
const QUERY_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single key or value for use in a query string.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT_SET).to_string()
}

/// Serialize query parameters into a query string.
///
/// Returns an empty string for `None` or an empty query, otherwise `?`
/// followed by `&`-joined `key=value` pairs. List values repeat the key once
/// per element, in element order.
pub fn serialize_query(query: Option<&Query>) -> String {
    let Some(query) = query else {
        return String::new();
    };
    if query.is_empty() {
        return String::new();
    }

    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query.iter() {
        let key = encode_component(key);
        match value {
            QueryValue::Scalar(v) => pairs.push(format!("{key}={}", encode_component(v))),
            QueryValue::List(items) => {
                for item in items {
                    pairs.push(format!("{key}={}", encode_component(item)));
                }
            }
        }
    }
    format!("?{}", pairs.join("&"))
}

/// Result of decoding a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The body parsed as JSON.
    Structured(Value),
    /// The body was not valid JSON; the raw text is kept verbatim.
    Fallback(String),
}

/// Strictly parse `raw` as JSON, falling back to the raw text.
///
/// Never fails: an empty body is not valid JSON and decodes to
/// `Fallback("")`.
pub fn decode_body(raw: &str) -> Decoded {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Decoded::Structured(value),
        Err(err) => {
            tracing::trace!(error = %err, len = raw.len(), "response body is not JSON");
            Decoded::Fallback(raw.to_string())
        }
    }
}

/// Parse a raw header block into a name → value map.
///
/// Each line is split on the first `": "`. Lines missing a name or a value
/// are skipped. Names keep the case they were received in; a repeated name
/// keeps its last value.
pub fn parse_header_block(block: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in block.trim().split(['\r', '\n']) {
        let Some((name, value)) = line.split_once(": ") else {
            continue;
        };
        if name.is_empty() || value.is_empty() {
            continue;
        }
        headers.insert(name.to_string(), value.to_string());
    }
    headers
}

/// Render a header map as a `Name: value\r\n` block.
///
/// Values that are not visible ASCII are skipped, as a browser would.
pub fn render_header_block(headers: &http::HeaderMap) -> String {
    let mut block = String::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            block.push_str(name.as_str());
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
    }
    block
}

/// Lay `overlay` over `base`. Header names compare case-insensitively; a
/// later entry replaces an earlier one in place, name included.
pub fn merge_headers(
    base: &[(String, String)],
    overlay: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::with_capacity(base.len() + overlay.len());
    for (name, value) in base.iter().chain(overlay) {
        match merged.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => *entry = (name.clone(), value.clone()),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}
