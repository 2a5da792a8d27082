//! Request execution: one descriptor in, one settled outcome out.
//!
//! # Design
//! A [`Transport`] only performs the exchange and reports what came back as
//! raw data ([`HttpResponse`]). Everything after that (header capture, body
//! decoding, success classification) is done once, in [`execute`], so every
//! backend settles calls identically.
//!
//! Two backends are provided and chosen when the client is constructed:
//! - [`NetworkTransport`] performs a real HTTP exchange with `ureq` on a
//!   blocking worker thread.
//! - [`ServiceTransport`] drives an in-process `tower::Service` (for example
//!   an axum `Router`) without opening a socket.

use async_trait::async_trait;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::codec;
use crate::envelope::Envelope;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Upper bound on a response body read by the network backend.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Performs a single request/response exchange.
///
/// Implementations must return `Ok` for every exchange that produced a
/// status code, whatever that code is, and `Err` only when no response was
/// obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Send `request` and settle it into an envelope.
///
/// Statuses whose leading digit is 2 resolve to `Ok`; every other status
/// resolves to `Err(ApiError::Http)` carrying the same envelope shape.
pub async fn execute(
    transport: &dyn Transport,
    request: HttpRequest,
) -> Result<Envelope, ApiError> {
    let method = request.method;
    let url = request.full_url();

    let response = match transport.send(request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(%method, %url, error = %err, "exchange failed");
            return Err(err.into());
        }
    };

    let envelope = Envelope::from_response(&response);
    let success = envelope.is_success();
    tracing::debug!(%method, %url, status = envelope.status, success, "exchange completed");

    if success {
        Ok(envelope)
    } else {
        Err(ApiError::Http(Box::new(envelope)))
    }
}

// ---------------------------------------------------------------------------
// Network backend
// ---------------------------------------------------------------------------

/// Standalone backend performing real HTTP over the network.
///
/// Must be used from within a Tokio runtime; each exchange runs on the
/// runtime's blocking pool.
///
/// Status codes are never treated as errors by the agent; classification is
/// left to [`execute`].
#[derive(Clone)]
pub struct NetworkTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for NetworkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkTransport").finish_non_exhaustive()
    }
}

impl NetworkTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || exchange(&agent, &request))
            .await
            .map_err(|e| TransportError::Aborted(e.to_string()))?
    }
}

fn exchange(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let url = request.full_url();
    let headers = request.effective_headers();
    let body = request
        .body_text()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

    let result = match (request.method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&url), &headers).call(),
        (HttpMethod::Delete, None) => with_headers(agent.delete(&url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(&url), &headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty(),
        (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Patch, None) => with_headers(agent.patch(&url), &headers).send_empty(),
    };

    let mut response = result.map_err(map_ureq_error)?;
    let status = response.status().as_u16();
    let header_block = codec::render_header_block(response.headers());
    let bytes = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
        .map_err(|e| TransportError::Body(e.to_string()))?;

    Ok(HttpResponse {
        status,
        header_block,
        body: lossy_text(&bytes),
    })
}

/// Body bytes as text. Invalid UTF-8 is replaced rather than rejected, so a
/// response with a status always settles into an envelope.
fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Http(e) => TransportError::InvalidRequest(e.to_string()),
        ureq::Error::BadUri(uri) => TransportError::InvalidRequest(format!("bad uri: {uri}")),
        other => TransportError::Connection(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// In-process backend
// ---------------------------------------------------------------------------

/// In-process backend that hands each request to a `tower::Service`.
///
/// The service is cloned per call, so concurrent calls never share
/// per-request state.
#[derive(Debug, Clone)]
pub struct ServiceTransport<S> {
    service: S,
}

impl<S> ServiceTransport<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S, B> Transport for ServiceTransport<S>
where
    S: tower::Service<http::Request<String>, Response = http::Response<B>>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let http_request = to_http_request(&request)?;

        let response = self
            .service
            .clone()
            .oneshot(http_request)
            .await
            .map_err(|e| TransportError::Connection(Into::<BoxError>::into(e).to_string()))?;

        let status = response.status().as_u16();
        let header_block = codec::render_header_block(response.headers());
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(Into::<BoxError>::into(e).to_string()))?
            .to_bytes();

        Ok(HttpResponse {
            status,
            header_block,
            body: lossy_text(&bytes),
        })
    }
}

fn to_http_request(request: &HttpRequest) -> Result<http::Request<String>, TransportError> {
    let body = request
        .body_text()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?
        .unwrap_or_default();

    let mut builder = http::Request::builder()
        .method(http::Method::from(request.method))
        .uri(request.full_url());
    for (name, value) in request.effective_headers() {
        builder = builder.header(name, value);
    }
    builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}
