//! HTTP request descriptors and raw exchange results.
//!
//! # Design
//! These types describe one request/response cycle as plain data. The
//! client builds an `HttpRequest` (the descriptor) per call; a
//! [`Transport`](crate::transport::Transport) executes it and hands back an
//! `HttpResponse` carrying the status, the raw multi-line header block and
//! the body text exactly as received. Decoding into an
//! [`Envelope`](crate::envelope::Envelope) happens afterwards, in one place.
//!
//! All fields use owned types so a descriptor can be moved onto a blocking
//! worker or into a service future without lifetime concerns.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::codec;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

/// A single query parameter value: one scalar, or a list that expands to a
/// repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_number!(i32, i64, u8, u16, u32, u64, usize, f64);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(values: [T; N]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered query parameters. Pairs serialize in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter and return `self` for chaining.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a query from any value that serializes to a map, such as a
    /// typed query struct.
    ///
    /// Strings, numbers and booleans become scalars, arrays become repeated
    /// keys, `null` entries are skipped and nested objects are sent as JSON
    /// text. Entries keep the field declaration order.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let Value::Object(map) = serde_json::to_value(value)? else {
            return Err(<serde_json::Error as serde::ser::Error>::custom(
                "query parameters must serialize to a map",
            ));
        };

        let mut query = Query::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let items = items.into_iter().filter(|v| !v.is_null()).map(scalar_text);
                    query.push(key, QueryValue::List(items.collect()));
                }
                other => query.push(key, QueryValue::Scalar(scalar_text(other))),
            }
        }
        Ok(query)
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.push(key, value);
        }
        query
    }
}

/// The descriptor for one request. Built fresh per call and never mutated
/// once handed to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Option<Query>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: None,
            body: None,
        }
    }

    /// The URL the transport should open: base URL plus serialized query.
    pub fn full_url(&self) -> String {
        format!("{}{}", self.url, codec::serialize_query(self.query.as_ref()))
    }

    /// The body as JSON text, or `None` when nothing should be sent.
    ///
    /// GET requests never carry a body.
    pub fn body_text(&self) -> Result<Option<String>, serde_json::Error> {
        if self.method == HttpMethod::Get {
            return Ok(None);
        }
        self.body.as_ref().map(serde_json::to_string).transpose()
    }

    /// Headers with duplicate names collapsed, the last value winning.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        codec::merge_headers(&[], &self.headers)
    }
}

/// The raw result of one exchange, as produced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Multi-line `Name: value` block, one header per line.
    pub header_block: String,
    pub body: String,
}
