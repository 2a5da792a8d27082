//! Helix API client: base headers, per-call overlays and dispatch.
//!
//! # Design
//! `HelixClient` holds the validated configuration, the base header set
//! derived from it, and the transport chosen at construction. It carries no
//! mutable state between calls: every call builds a fresh [`HttpRequest`]
//! (copying the base headers), hands it to [`transport::execute`] and
//! returns the settled envelope. `build_request` is public so the exact
//! descriptor can be inspected without any I/O.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::codec;
use crate::config::HelixConfig;
use crate::endpoints::{self, Endpoint};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Query};
use crate::transport::{self, NetworkTransport, ServiceTransport, Transport};

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Headers laid over the base set; they win on a name collision.
    pub headers: Vec<(String, String)>,
    /// Base URL to use instead of the configured one for this call.
    pub url: Option<String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Client for the Helix API.
#[derive(Clone)]
pub struct HelixClient {
    config: HelixConfig,
    headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for HelixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelixClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HelixClient {
    /// Client that talks to the network.
    pub fn new(config: HelixConfig) -> Self {
        Self::with_transport(config, Arc::new(NetworkTransport::new()))
    }

    /// Client that dispatches every call to an in-process `tower::Service`.
    pub fn in_process<S>(config: HelixConfig, service: S) -> Self
    where
        ServiceTransport<S>: Transport + 'static,
    {
        Self::with_transport(config, Arc::new(ServiceTransport::new(service)))
    }

    pub fn with_transport(config: HelixConfig, transport: Arc<dyn Transport>) -> Self {
        let headers = config.base_headers();
        Self {
            config,
            headers,
            transport,
        }
    }

    pub fn config(&self) -> &HelixConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn base_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Build the descriptor for one call without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<Query>,
        body: Option<Value>,
        options: &CallOptions,
    ) -> HttpRequest {
        let base = options
            .url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or_else(|| self.config.base_url());

        HttpRequest {
            method,
            url: format!("{base}{path}"),
            headers: codec::merge_headers(&self.headers, &options.headers),
            query,
            body,
        }
    }

    /// Send a request to `path` and settle it.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<Query>,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Envelope, ApiError> {
        let request = self.build_request(method, path, query, body, options);
        transport::execute(self.transport.as_ref(), request).await
    }

    /// Call a table endpoint after checking its query and body rules.
    #[tracing::instrument(skip_all, fields(endpoint = endpoint.name))]
    pub async fn call(
        &self,
        endpoint: &Endpoint,
        query: Option<Query>,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Envelope, ApiError> {
        check_inputs(endpoint, query.as_ref(), body.as_ref())?;
        self.execute(endpoint.method, endpoint.path, query, body, options)
            .await
    }

    /// Like [`call`](Self::call), serializing a typed body first.
    pub async fn call_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        query: Option<Query>,
        body: &B,
        options: &CallOptions,
    ) -> Result<Envelope, ApiError> {
        let body = serde_json::to_value(body)?;
        self.call(endpoint, query, Some(body), options).await
    }

    /// Call an endpoint by its table name, e.g. `"get_users"`.
    pub async fn call_named(
        &self,
        name: &str,
        query: Option<Query>,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Envelope, ApiError> {
        let endpoint = endpoints::find(name)
            .ok_or_else(|| ApiError::InvalidCall(format!("unknown endpoint {name:?}")))?;
        self.call(endpoint, query, body, options).await
    }
}

fn check_inputs(
    endpoint: &Endpoint,
    query: Option<&Query>,
    body: Option<&Value>,
) -> Result<(), ApiError> {
    let has_query = query.is_some_and(|q| !q.is_empty());
    endpoint
        .query
        .check(has_query)
        .map_err(|why| ApiError::InvalidCall(format!("{}: query {why}", endpoint.name)))?;
    endpoint
        .body
        .check(body.is_some())
        .map_err(|why| ApiError::InvalidCall(format!("{}: body {why}", endpoint.name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                header_block: String::new(),
                body: r#"{"data":[]}"#.to_string(),
            })
        }
    }

    fn config() -> HelixConfig {
        HelixConfig::builder("abc")
            .token("tok")
            .base_url("http://localhost:3000")
            .build()
            .unwrap()
    }

    fn recording_client() -> (HelixClient, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let client = HelixClient::with_transport(config(), recorder.clone());
        (client, recorder)
    }

    fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
        req.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn build_request_joins_base_and_path() {
        let client = HelixClient::new(config());
        let req = client.build_request(
            HttpMethod::Get,
            "/helix/users",
            None,
            None,
            &CallOptions::new(),
        );
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/helix/users");
        assert_eq!(req.full_url(), "http://localhost:3000/helix/users");
        assert_eq!(header(&req, "Client-ID"), Some("abc"));
        assert_eq!(header(&req, "Authorization"), Some("Bearer tok"));
        assert_eq!(header(&req, "Content-Type"), Some("application/json"));
    }

    #[test]
    fn overlay_header_wins() {
        let client = HelixClient::new(config());
        let options = CallOptions::new().header("Client-ID", "override");
        let req = client.build_request(HttpMethod::Get, "/helix/users", None, None, &options);
        assert_eq!(header(&req, "Client-ID"), Some("override"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("client-id"))
                .count(),
            1
        );
        // the base set is copied, not changed
        assert_eq!(client.base_headers()[0].1, "abc");
    }

    #[test]
    fn url_override_replaces_base() {
        let client = HelixClient::new(config());
        let options = CallOptions::new().url("http://mirror.local/");
        let req = client.build_request(HttpMethod::Get, "/helix/games", None, None, &options);
        assert_eq!(req.url, "http://mirror.local/helix/games");
    }

    #[test]
    fn no_token_means_no_authorization() {
        let config = HelixConfig::builder("abc").build().unwrap();
        let client = HelixClient::new(config);
        assert!(client
            .base_headers()
            .iter()
            .all(|(k, _)| k != "Authorization"));
    }

    #[tokio::test]
    async fn call_sends_table_method_and_path() {
        let (client, recorder) = recording_client();
        let endpoint = endpoints::find("get_users").unwrap();
        let query = Query::new().param("login", vec!["alice", "bob"]);
        client
            .call(endpoint, Some(query), None, &CallOptions::new())
            .await
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(
            seen[0].full_url(),
            "http://localhost:3000/helix/users?login=alice&login=bob"
        );
    }

    #[tokio::test]
    async fn call_json_serializes_body() {
        let (client, recorder) = recording_client();
        let endpoint = endpoints::find("create_stream_marker").unwrap();
        client
            .call_json(
                endpoint,
                None,
                &json!({"user_id": "1", "description": "hi"}),
                &CallOptions::new(),
            )
            .await
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(
            seen[0].body,
            Some(json!({"user_id": "1", "description": "hi"}))
        );
    }

    #[tokio::test]
    async fn missing_required_query_is_rejected_before_sending() {
        let (client, recorder) = recording_client();
        let endpoint = endpoints::find("get_videos").unwrap();
        let err = client
            .call(endpoint, None, None, &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCall(ref msg) if msg == "get_videos: query required"));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unexpected_body_is_rejected() {
        let (client, _) = recording_client();
        let err = client
            .call_named("get_users", None, Some(json!({})), &CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCall(_)));
    }

    #[tokio::test]
    async fn unknown_endpoint_name() {
        let (client, _) = recording_client();
        let err = client
            .call_named("get_everything", None, None, &CallOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"invalid call: unknown endpoint "get_everything""#);
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let (client, recorder) = recording_client();
        let options_a = CallOptions::new().header("X-Call", "a");
        let options_b = CallOptions::new().header("X-Call", "b");
        let a = client.execute(HttpMethod::Get, "/helix/users", None, None, &options_a);
        let b = client.execute(HttpMethod::Get, "/helix/games", None, None, &options_b);
        let (a, b) = tokio::join!(a, b);
        assert!(a.is_ok() && b.is_ok());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for req in seen.iter() {
            let expected = if req.url.ends_with("/users") { "a" } else { "b" };
            assert_eq!(header(req, "X-Call"), Some(expected));
        }
    }
}
