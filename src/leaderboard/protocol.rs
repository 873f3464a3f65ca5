//! Leaderboard HTTP API
//!
//! Endpoint paths and the request/response bodies of the public service.

use serde::{Deserialize, Serialize};

pub const ENDPOINT_USER: &str = "/user";
pub const ENDPOINT_USER_BY_ID: &str = "/user/:user_id";
pub const ENDPOINT_INCREMENT: &str = "/user/:user_id/increment";
pub const ENDPOINT_DECREMENT: &str = "/user/:user_id/decrement";
pub const ENDPOINT_CHANGE_GROUP: &str = "/user/:user_id/:group";
pub const ENDPOINT_TOP_GLOBAL: &str = "/topk/global";
pub const ENDPOINT_TOP_GROUP: &str = "/topk/entity/:group";
pub const ENDPOINT_RANK: &str = "/rank/:user_id";
pub const ENDPOINT_PROFILE: &str = "/leaderboard/:user_id";
pub const ENDPOINT_STATS: &str = "/stats";

/// Query string of the increment and decrement endpoints.
///
/// `entity` absent keeps the member's current group; present (even empty) assigns it.
/// `score` is kept as text so a malformed number can be reported as a bad request.
#[derive(Debug, Deserialize)]
pub struct ScoreParams {
    #[serde(rename = "entity")]
    pub group: Option<String>,
    pub score: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankResponse {
    #[serde(rename = "globalRank")]
    pub global_rank: i64,
    #[serde(rename = "entityRank")]
    pub group_rank: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
