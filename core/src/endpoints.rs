//! Declarative table of Helix endpoints.
//!
//! Each entry records only what differs between endpoints: method, path and
//! whether a query string or a body is accepted. Calls are dispatched
//! through [`HelixClient::call`](crate::client::HelixClient::call), which
//! checks the inputs against the entry before executing.

use crate::http::HttpMethod;
use crate::http::HttpMethod::{Delete, Get, Patch, Post, Put};

use self::Input::{Never, Optional, Required};

/// Whether an endpoint takes a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Never,
    Optional,
    Required,
}

impl Input {
    /// `Err` describes the mismatch between this rule and `present`.
    pub(crate) fn check(self, present: bool) -> Result<(), &'static str> {
        match (self, present) {
            (Input::Never, true) => Err("not accepted"),
            (Input::Required, false) => Err("required"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub query: Input,
    pub body: Input,
}

const fn endpoint(
    name: &'static str,
    method: HttpMethod,
    path: &'static str,
    query: Input,
    body: Input,
) -> Endpoint {
    Endpoint {
        name,
        method,
        path,
        query,
        body,
    }
}

pub const ENDPOINTS: &[Endpoint] = &[
    // Ads
    endpoint("start_commercial", Post, "/helix/channels/commercial", Never, Required),
    // Analytics
    endpoint("get_extension_analytics", Get, "/helix/analytics/extensions", Optional, Never),
    endpoint("get_game_analytics", Get, "/helix/analytics/games", Optional, Never),
    // Bits
    endpoint("get_cheermotes", Get, "/helix/bits/cheermotes", Optional, Never),
    endpoint("get_bits_leaderboard", Get, "/helix/bits/leaderboard", Optional, Never),
    endpoint("get_extensions_transactions", Get, "/helix/extensions/transactions", Required, Never),
    // Channel points
    endpoint("create_custom_reward", Post, "/helix/channel_points/custom_rewards", Required, Required),
    endpoint("delete_custom_reward", Delete, "/helix/channel_points/custom_rewards", Required, Never),
    endpoint("get_custom_rewards", Get, "/helix/channel_points/custom_rewards", Required, Never),
    endpoint(
        "get_custom_reward_redemption",
        Get,
        "/helix/channel_points/custom_rewards/redemptions",
        Required,
        Never,
    ),
    endpoint("update_custom_reward", Patch, "/helix/channel_points/custom_rewards", Required, Required),
    endpoint(
        "update_custom_reward_redemption_status",
        Patch,
        "/helix/channel_points/custom_rewards",
        Required,
        Required,
    ),
    // Clips
    endpoint("create_clip", Post, "/helix/clips", Required, Never),
    endpoint("get_clips", Get, "/helix/clips", Required, Never),
    // Entitlements
    endpoint("create_entitlement_grants_upload_url", Post, "/helix/entitlements/upload", Required, Never),
    endpoint("get_code_status", Get, "/helix/entitlements/codes", Required, Never),
    endpoint("redeem_code", Post, "/helix/entitlements/code", Required, Never),
    // Games
    endpoint("get_top_games", Get, "/helix/games/top", Optional, Never),
    endpoint("get_games", Get, "/helix/games", Required, Never),
    // Moderation
    endpoint("check_auto_mod_status", Post, "/helix/moderation/enforcements/status", Required, Required),
    endpoint("get_banned_users", Get, "/helix/moderation/banned", Required, Never),
    endpoint("get_banned_events", Get, "/helix/moderation/banned/events", Required, Never),
    endpoint("get_moderators", Get, "/helix/moderation/moderators", Required, Never),
    endpoint("get_moderator_events", Get, "/helix/moderation/moderators/events", Required, Never),
    // Search
    endpoint("search_categories", Get, "/helix/search/categories", Required, Never),
    endpoint("search_channels", Get, "/helix/search/channels", Required, Never),
    // Streams
    endpoint("get_stream_key", Get, "/helix/streams/key", Required, Never),
    endpoint("get_streams", Get, "/helix/streams", Optional, Never),
    endpoint("get_streams_metadata", Get, "/helix/streams/metadata", Optional, Never),
    endpoint("create_stream_marker", Post, "/helix/streams/markers", Never, Required),
    endpoint("get_stream_markers", Get, "/helix/streams/markers", Required, Never),
    // Channels
    endpoint("get_channel_information", Get, "/helix/channels", Required, Never),
    endpoint("modify_channel_information", Patch, "/helix/channels", Required, Never),
    // Subscriptions
    endpoint("get_broadcaster_subscriptions", Get, "/helix/subscriptions", Required, Never),
    // Tags
    endpoint("get_all_stream_tags", Get, "/helix/tags/streams", Optional, Never),
    endpoint("get_stream_tags", Get, "/helix/streams/tags", Required, Never),
    endpoint("replace_stream_tags", Put, "/helix/streams/tags", Required, Optional),
    // Users
    endpoint("create_user_follow", Post, "/helix/users/follows", Optional, Required),
    endpoint("delete_user_follow", Delete, "/helix/users/follows", Required, Never),
    endpoint("get_users", Get, "/helix/users", Optional, Never),
    endpoint("get_user_follows", Get, "/helix/users/follows", Required, Never),
    endpoint("update_user", Put, "/helix/users", Optional, Never),
    endpoint("get_user_extensions", Get, "/helix/users/extensions/list", Never, Never),
    endpoint("get_user_active_extensions", Get, "/helix/users/extensions", Optional, Never),
    endpoint("update_user_extensions", Put, "/helix/users/extensions", Never, Required),
    // Videos
    endpoint("get_videos", Get, "/helix/videos", Required, Never),
    endpoint("get_webhook_subscriptions", Get, "/helix/webhooks/subscriptions", Optional, Never),
    // Hype train
    endpoint("get_hype_train_events", Get, "/helix/hypetrain/events", Required, Never),
];

/// Look up an endpoint by its snake_case name.
pub fn find(name: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|e| e.name == name)
}
