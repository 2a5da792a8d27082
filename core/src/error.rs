//! Error types for the Helix client core.
//!
//! # Design
//! A completed exchange with a non-2xx status is `ApiError::Http` and
//! carries the same [`Envelope`] a success would, so callers can still read
//! the status, headers and payload. Failures that happen before any status
//! exists are `ApiError::Transport`; the two are told apart by
//! [`ApiError::status`]. Body decoding never fails and has no variant here.

use thiserror::Error;

use crate::envelope::Envelope;

/// Errors returned by `HelixClient` calls and [`crate::transport::execute`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange completed with a status outside the success class.
    #[error("HTTP {}: {}", .0.status, .0.message().unwrap_or("<structured body>"))]
    Http(Box<Envelope>),

    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body or query could not be converted to structured data.
    #[error("failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An endpoint was called with inputs it does not accept.
    #[error("invalid call: {0}")]
    InvalidCall(String),
}

impl ApiError {
    /// The HTTP status, present only for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        self.envelope().map(|env| env.status)
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            ApiError::Http(env) => Some(env),
            _ => None,
        }
    }

    /// Take the failure envelope, if this is an `Http` error.
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            ApiError::Http(env) => Some(*env),
            _ => None,
        }
    }
}

/// Failures below HTTP: nothing with a status code came back.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The descriptor could not be turned into a request (bad URI or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// DNS, connect, TLS or I/O failure while exchanging.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The response body could not be read as text.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The worker running the exchange was cancelled or panicked.
    #[error("exchange aborted: {0}")]
    Aborted(String),
}

/// Invalid or missing client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("client id must not be empty")]
    MissingClientId,

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("environment variable {name}: {source}")]
    Env {
        name: &'static str,
        #[source]
        source: std::env::VarError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Payload;
    use std::collections::HashMap;

    fn not_found() -> Envelope {
        Envelope {
            status: 404,
            headers: HashMap::new(),
            payload: Payload::Fallback("Not Found".to_string()),
        }
    }

    #[test]
    fn http_error_exposes_status_and_envelope() {
        let err = ApiError::Http(Box::new(not_found()));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(err.into_envelope(), Some(not_found()));
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::from(TransportError::Connection("refused".to_string()));
        assert_eq!(err.status(), None);
        assert!(err.envelope().is_none());
        assert_eq!(err.to_string(), "connection failed: refused");
    }
}
