//! `/listening`: what a linked user is playing right now

use reqwest::StatusCode;
use serde::Deserialize;
use serenity::{
    builder::{CreateEmbed, CreateInteractionResponseMessage},
    model::Colour,
};
use tracing::{debug, info, warn};

use crate::error::BotError;

pub const NOT_LINKED_SELF: &str = "❌ Account not linked! Use `/link` to connect it.";
pub const API_UNREACHABLE: &str = "⚠️ Muzeer API is unreachable.";
pub const API_CONNECTION_FAILED: &str = "⚠️ Failed to connect to API.";
pub const NOT_LISTENING: &str = "Not listening to anything right now.";

/// The Discord identity a command was invoked by or about
#[derive(Debug, Clone)]
pub struct DiscordUser {
    pub id: u64,
    /// Account username
    pub name: String,
    /// Server nickname or global display name
    pub display_name: String,
    pub avatar_url: String,
}

/// Playback state reported by the presence API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresenceState {
    #[serde(rename = "isPlaying")]
    pub is_playing: bool,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub webpage_url: Option<String>,
    /// Playback start in epoch milliseconds
    #[serde(rename = "startTimestamp")]
    pub start_timestamp: Option<f64>,
}

/// Body of a successful presence lookup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresenceSnapshot {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    pub presence: Option<PresenceState>,
}

/// Outcome of a presence lookup
#[derive(Debug, Clone)]
pub enum ListeningLookup {
    Found(PresenceSnapshot),
    /// No Muzeer account is linked to the Discord id
    NotLinked,
}

/// Client for the bot-facing presence API
#[derive(Debug, Clone)]
pub struct PresenceClient {
    client: reqwest::Client,
    api_base: String,
}

impl PresenceClient {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// Lookup URL for a Discord user id
    pub fn endpoint(&self, platform_id: u64) -> String {
        format!("{}/listening/{}", self.api_base.trim_end_matches('/'), platform_id)
    }

    /// Ask the presence API what `platform_id` is listening to
    pub async fn listening(&self, platform_id: u64) -> Result<ListeningLookup, BotError> {
        let url = self.endpoint(platform_id);
        debug!("Fetching presence from {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(ListeningLookup::Found(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(ListeningLookup::NotLinked),
            status => Err(BotError::UnexpectedStatus(status)),
        }
    }
}

/// Message shown when the queried user has no linked account
pub fn not_linked_message(requester: &DiscordUser, target: Option<&DiscordUser>) -> String {
    match target {
        Some(target) if target.id != requester.id => format!(
            "❌ {} hasn't linked their Muzeer account yet!",
            target.display_name
        ),
        _ => NOT_LINKED_SELF.to_string(),
    }
}

/// Profile card for a successful lookup
pub fn render_presence(snapshot: &PresenceSnapshot, user: &DiscordUser) -> CreateEmbed {
    let user_name = snapshot
        .user_name
        .as_deref()
        .unwrap_or(&user.display_name);

    let now_playing = match &snapshot.presence {
        Some(presence) if presence.is_playing => {
            let start_seconds = (presence.start_timestamp.unwrap_or(0.0) / 1000.0) as i64;
            format!(
                "**[{}]({})**\n👤 by {}\n\n⏱️ **Started:** <t:{}:R>",
                presence.title.as_deref().unwrap_or("Unknown"),
                presence.webpage_url.as_deref().unwrap_or(""),
                presence.artist.as_deref().unwrap_or("Unknown"),
                start_seconds
            )
        }
        _ => NOT_LISTENING.to_string(),
    };

    CreateEmbed::new()
        .title(format!("🎧 {}'s Profile", user_name))
        .color(Colour::from_rgb(255, 180, 84))
        .thumbnail(user.avatar_url.clone())
        .field("Now Playing", now_playing, true)
}

/// `/listening` reply for `target`, defaulting to the requester
pub async fn listening_reply(
    client: &PresenceClient,
    requester: &DiscordUser,
    target: Option<&DiscordUser>,
) -> CreateInteractionResponseMessage {
    let user = target.unwrap_or(requester);
    info!("/listening by {} for {}", requester.name, user.name);

    match client.listening(user.id).await {
        Ok(ListeningLookup::Found(snapshot)) => {
            CreateInteractionResponseMessage::new().embed(render_presence(&snapshot, user))
        }
        Ok(ListeningLookup::NotLinked) => {
            debug!("No linked account for {}", user.id);
            CreateInteractionResponseMessage::new().content(not_linked_message(requester, target))
        }
        Err(BotError::UnexpectedStatus(status)) => {
            warn!("Presence API returned status {}", status);
            CreateInteractionResponseMessage::new().content(API_UNREACHABLE)
        }
        Err(e) => {
            warn!("Presence API connection error: {}", e);
            CreateInteractionResponseMessage::new().content(API_CONNECTION_FAILED)
        }
    }
}
