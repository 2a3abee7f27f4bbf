use anyhow::Result;
use bot::{BotConfig, Handler};
use serenity::{Client, all::GatewayIntents};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Discord presence bridge");

    let config = BotConfig::from_env()?;
    let handler = Handler::from_config(&config)?;

    // Slash commands arrive as interactions, no privileged intents needed
    let mut client = Client::builder(&config.discord_token, GatewayIntents::empty())
        .event_handler(handler)
        .await?;

    client.start().await?;

    Ok(())
}
