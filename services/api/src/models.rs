//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod track;
pub mod user;

use self::user::Presence;

/// Request body for `POST /api/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

/// Query string for `GET /api/stream`
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub vid: Option<String>,
}

/// Request for user registration
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// Response for a successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub message: String,
}

/// Response for the bot's listening lookup
#[derive(Debug, Serialize)]
pub struct ListeningResponse {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "discordName")]
    pub discord_name: String,
    pub presence: Option<Presence>,
}
