//! A small stand-in for the Helix API, used by the client's tests.
//!
//! Serves a handful of endpoints with the same status codes and body shapes
//! the real API uses, plus `/echo`, which reflects the request back so tests
//! can see exactly what the client sent. Unknown paths get a plain-text
//! `Not Found`, which exercises the client's non-JSON fallback.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomReward {
    pub id: String,
    pub broadcaster_id: String,
    pub title: String,
    pub cost: u64,
    pub is_enabled: bool,
    pub prompt: String,
}

#[derive(Deserialize)]
pub struct CreateReward {
    pub title: String,
    pub cost: u64,
    #[serde(default)]
    pub prompt: String,
    pub is_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateReward {
    pub title: Option<String>,
    pub cost: Option<u64>,
    pub prompt: Option<String>,
    pub is_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct RewardQuery {
    pub broadcaster_id: Option<String>,
    pub id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_login: String,
    pub game_name: String,
    pub viewer_count: u64,
}

pub type Db = Arc<RwLock<HashMap<String, CustomReward>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/helix/users", get(get_users))
        .route("/helix/streams", get(get_streams))
        .route(
            "/helix/channel_points/custom_rewards",
            get(list_rewards)
                .post(create_reward)
                .patch(update_reward)
                .delete(delete_reward),
        )
        .route("/echo", any(echo))
        .fallback(not_found)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The JSON error body Helix returns for most failures.
fn helix_error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": status.canonical_reason().unwrap_or_default(),
        "status": status.as_u16(),
        "message": message,
    });
    (status, Json(body)).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    if !headers.contains_key("client-id") {
        return Err(helix_error(StatusCode::UNAUTHORIZED, "Client ID is missing"));
    }
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !bearer {
        return Err(helix_error(StatusCode::UNAUTHORIZED, "OAuth token is missing"));
    }
    Ok(())
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, Response> {
    value.as_deref().ok_or_else(|| {
        helix_error(
            StatusCode::BAD_REQUEST,
            &format!("Missing required parameter \"{name}\""),
        )
    })
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn get_users(headers: HeaderMap, Query(params): Query<Vec<(String, String)>>) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let users: Vec<User> = params
        .iter()
        .filter(|(key, _)| key == "login")
        .enumerate()
        .map(|(i, (_, login))| User {
            id: (i + 1).to_string(),
            login: login.clone(),
            display_name: login.to_uppercase(),
        })
        .collect();
    (
        [("Ratelimit-Remaining", "799")],
        Json(json!({ "data": users })),
    )
        .into_response()
}

/// Every requested `user_login` is live; `first` caps the page size.
async fn get_streams(headers: HeaderMap, Query(params): Query<Vec<(String, String)>>) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let first = match params.iter().find(|(key, _)| key == "first") {
        Some((_, raw)) => match raw.parse::<usize>() {
            Ok(n) if (1..=100).contains(&n) => n,
            _ => {
                return helix_error(
                    StatusCode::BAD_REQUEST,
                    "The parameter \"first\" was malformed: the value must be greater than or equal to 1 and less than or equal to 100",
                )
            }
        },
        None => 20,
    };
    let streams: Vec<Stream> = params
        .iter()
        .filter(|(key, _)| key == "user_login")
        .take(first)
        .enumerate()
        .map(|(i, (_, login))| Stream {
            id: format!("{}", 1000 + i),
            user_login: login.clone(),
            game_name: "Just Chatting".to_string(),
            viewer_count: 10 * (i as u64 + 1),
        })
        .collect();
    Json(json!({ "data": streams, "pagination": {} })).into_response()
}

async fn list_rewards(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RewardQuery>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let broadcaster_id = match require(&query.broadcaster_id, "broadcaster_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let rewards = db.read().await;
    let mut data: Vec<CustomReward> = rewards
        .values()
        .filter(|r| r.broadcaster_id == broadcaster_id)
        .filter(|r| query.id.as_ref().map_or(true, |id| &r.id == id))
        .cloned()
        .collect();
    data.sort_by(|a, b| a.title.cmp(&b.title));
    Json(json!({ "data": data })).into_response()
}

async fn create_reward(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RewardQuery>,
    Json(input): Json<CreateReward>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let broadcaster_id = match require(&query.broadcaster_id, "broadcaster_id") {
        Ok(id) => id.to_string(),
        Err(resp) => return resp,
    };
    let reward = CustomReward {
        id: Uuid::new_v4().to_string(),
        broadcaster_id,
        title: input.title,
        cost: input.cost,
        is_enabled: input.is_enabled.unwrap_or(true),
        prompt: input.prompt,
    };
    tracing::debug!(id = %reward.id, title = %reward.title, "reward created");
    db.write().await.insert(reward.id.clone(), reward.clone());
    Json(json!({ "data": [reward] })).into_response()
}

async fn update_reward(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RewardQuery>,
    Json(input): Json<UpdateReward>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let id = match require(&query.id, "id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut rewards = db.write().await;
    let Some(reward) = rewards.get_mut(id) else {
        return helix_error(StatusCode::NOT_FOUND, "Custom Reward not found");
    };
    if let Some(title) = input.title {
        reward.title = title;
    }
    if let Some(cost) = input.cost {
        reward.cost = cost;
    }
    if let Some(prompt) = input.prompt {
        reward.prompt = prompt;
    }
    if let Some(is_enabled) = input.is_enabled {
        reward.is_enabled = is_enabled;
    }
    Json(json!({ "data": [reward.clone()] })).into_response()
}

async fn delete_reward(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RewardQuery>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let id = match require(&query.id, "id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match db.write().await.remove(id) {
        Some(_) => {
            tracing::debug!(%id, "reward deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        None => helix_error(StatusCode::NOT_FOUND, "Custom Reward not found"),
    }
}

/// Reflect the request: method, path, raw query, headers and body text.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), Value::String(value.to_string())))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": body,
    }))
}
