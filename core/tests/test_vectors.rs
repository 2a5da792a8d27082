//! Verify the codec and request execution against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) for envelopes avoids false
//! negatives from map ordering.

use std::sync::Mutex;

use async_trait::async_trait;
use helix_core::codec::{self, Decoded};
use helix_core::{
    CallOptions, HelixClient, HelixConfig, HttpMethod, HttpRequest, HttpResponse, Query,
    QueryValue, Transport, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Build a `Query` from a vector's `[[key, value], ...]` list.
fn parse_query(raw: &Value) -> Option<Query> {
    let pairs = raw.as_array()?;
    let mut query = Query::new();
    for pair in pairs {
        let key = pair[0].as_str().unwrap();
        let value = match &pair[1] {
            Value::Array(items) => {
                QueryValue::List(items.iter().map(|v| v.as_str().unwrap().to_string()).collect())
            }
            other => QueryValue::Scalar(other.as_str().unwrap().to_string()),
        };
        query.push(key, value);
    }
    Some(query)
}

fn parse_headers(raw: &Value) -> Vec<(String, String)> {
    raw.as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Replays one simulated response and keeps the request it was given.
struct Simulated {
    response: HttpResponse,
    seen: Mutex<Option<HttpRequest>>,
}

#[async_trait]
impl Transport for Simulated {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.seen.lock().unwrap() = Some(request);
        Ok(self.response.clone())
    }
}

// ---------------------------------------------------------------------------
// Query serialization
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let query = parse_query(&case["input"]);
        let expected = case["expected"].as_str().unwrap();

        let serialized = codec::serialize_query(query.as_ref());
        assert_eq!(serialized, expected, "{name}: serialized");
        assert_eq!(
            codec::serialize_query(query.as_ref()),
            serialized,
            "{name}: repeatable"
        );
    }
}

// ---------------------------------------------------------------------------
// Body decoding
// ---------------------------------------------------------------------------

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["raw"].as_str().unwrap();

        let expected = match case.get("fallback") {
            Some(message) => Decoded::Fallback(message.as_str().unwrap().to_string()),
            None => Decoded::Structured(case["structured"].clone()),
        };
        assert_eq!(codec::decode_body(body), expected, "{name}");
    }
}

// ---------------------------------------------------------------------------
// Full exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exchange_test_vectors() {
    let raw = include_str!("../../test-vectors/exchange.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let config = HelixConfig::builder("abc")
        .token("tok")
        .base_url(BASE_URL)
        .build()
        .unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let req = &case["request"];
        let sim = &case["simulated_response"];

        let transport = std::sync::Arc::new(Simulated {
            response: HttpResponse {
                status: sim["status"].as_u64().unwrap() as u16,
                header_block: sim["header_block"].as_str().unwrap().to_string(),
                body: sim["body"].as_str().unwrap().to_string(),
            },
            seen: Mutex::new(None),
        });
        let client = HelixClient::with_transport(config.clone(), transport.clone());

        let options = CallOptions {
            headers: parse_headers(&req["headers"]),
            url: None,
        };
        let body = req.get("body").cloned();
        let result = client
            .execute(
                parse_method(req["method"].as_str().unwrap()),
                req["path"].as_str().unwrap(),
                parse_query(&req["query"]),
                body,
                &options,
            )
            .await;

        // Verify the request handed to the transport
        let expected_req = &case["expected_request"];
        let sent = transport.seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.full_url(), expected_req["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(
            sent.body_text().unwrap().as_deref(),
            expected_req["body"].as_str(),
            "{name}: body"
        );
        let client_id = expected_req["client_id"].as_str().unwrap_or("abc");
        let sent_headers = sent.effective_headers();
        let sent_client_id = sent_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("client-id"))
            .map(|(_, v)| v.as_str());
        assert_eq!(sent_client_id, Some(client_id), "{name}: client id");

        // Verify the settled outcome
        let expected = &case["expected"];
        let envelope = match expected["outcome"].as_str().unwrap() {
            "ok" => result.unwrap_or_else(|e| panic!("{name}: expected ok, got {e}")),
            "http_error" => {
                let err = result.expect_err(name);
                assert_eq!(err.status(), expected["envelope"]["status"].as_u64().map(|s| s as u16));
                err.into_envelope().unwrap()
            }
            other => panic!("{name}: unknown outcome: {other}"),
        };
        assert_eq!(envelope.to_value(), expected["envelope"], "{name}: envelope");
    }
}
