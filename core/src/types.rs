//! Common Helix payload shapes.
//!
//! Responses are trusted rather than validated: these types only give
//! callers a convenient target for [`Envelope::data`](crate::Envelope::data).
//! Unknown fields, including the envelope's own `status` and `headers`, are
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

/// The wrapper most Helix endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelixResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Cursor for the next page, when there is one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Error body returned by the API for most failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelixErrorBody {
    pub error: String,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomReward {
    pub id: String,
    pub broadcaster_id: String,
    pub title: String,
    pub cost: u64,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub prompt: String,
}

/// Body for creating a custom reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomRewardBody {
    pub title: String,
    pub cost: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

/// Body for updating a custom reward. Only present fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomRewardBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}
