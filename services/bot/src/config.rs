//! Bot configuration

use anyhow::Result;

use crate::presence::PresenceClient;

/// Presence bridge configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token
    pub discord_token: String,
    /// Base URL of the bot-facing Muzeer API
    pub api_base_url: String,
    /// Base URL of the web client that completes account linking
    pub link_base_url: String,
}

impl BotConfig {
    /// Create a new BotConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DISCORD_TOKEN`: Discord bot token (required)
    /// - `API_BASE_URL`: Presence API base (default: "http://127.0.0.1:3000/api/bot")
    /// - `LINK_BASE_URL`: Web client base (default: "http://localhost:5173")
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable not set"))?;

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/api/bot".to_string());

        let link_base_url = std::env::var("LINK_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(BotConfig {
            discord_token,
            api_base_url,
            link_base_url,
        })
    }

    /// Build the presence API client for this configuration
    pub fn presence_client(&self) -> Result<PresenceClient> {
        let client = reqwest::Client::builder().build()?;
        Ok(PresenceClient::new(client, self.api_base_url.clone()))
    }
}
