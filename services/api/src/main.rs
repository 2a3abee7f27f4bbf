use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod accounts;
mod config;
mod error;
mod models;
mod relay;
mod repositories;
mod resolver;
mod routes;
mod state;
mod trending;
mod tracks;
mod validation;

#[cfg(test)]
mod test_support;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    config::AppConfig, relay::Relay, repositories::UserRepository, resolver::YtDlpResolver,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let http_client = reqwest::Client::builder().build()?;
    let relay = Relay::new(
        http_client,
        config.upstream_user_agent.clone(),
        config.upstream_referer.clone(),
    );

    let app_state = AppState {
        config: Arc::new(config.clone()),
        resolver: Arc::new(YtDlpResolver::new(config.ytdlp_path.clone())),
        relay,
        user_store: Arc::new(UserRepository::new(pool.clone())),
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool");
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
