//! Request-execution core for a Twitch Helix API client.
//!
//! # Overview
//! Turns a logical API call (method, path, query, body, header overlay) into
//! one authenticated HTTP exchange and a uniform [`Envelope`] of status,
//! headers and decoded payload. The envelope is returned on success and
//! carried inside [`ApiError::Http`] on failure, so both paths look alike.
//!
//! # Design
//! - [`codec`] holds the pure pieces: query serialization, body decoding
//!   with a `{message}` fallback, and header-block parsing.
//! - [`transport`] performs the exchange. The backend (network or an
//!   in-process `tower::Service`) is picked when the client is built.
//! - [`HelixClient`] owns the base headers (client id and optional bearer
//!   token) and lays per-call overlays on top.
//! - [`endpoints`] lists the Helix endpoints as data; nothing about them
//!   needs code of its own.
//! - No retries, pagination or rate limiting: a call is one exchange.

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{CallOptions, HelixClient};
pub use config::HelixConfig;
pub use endpoints::{Endpoint, Input};
pub use envelope::{Envelope, Payload};
pub use error::{ApiError, ConfigError, TransportError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, Query, QueryValue};
pub use transport::{execute, NetworkTransport, ServiceTransport, Transport};
pub use types::{HelixResponse, Pagination};
