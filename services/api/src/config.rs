//! Runtime configuration for the API service

use anyhow::Result;
use serde::Deserialize;

/// Browser-like user agent presented to the media host
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// API service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Prefix for proxy URLs handed to clients; empty keeps them relative
    pub public_base_url: String,
    /// Path or name of the yt-dlp executable
    pub ytdlp_path: String,
    /// Curated playlist backing the trending list
    pub trending_playlist_url: String,
    /// User-Agent sent on upstream audio requests
    pub upstream_user_agent: String,
    /// Referer sent on upstream audio requests
    pub upstream_referer: String,
    /// Origin allowed by CORS (the web client)
    pub cors_origin: String,
}

impl AppConfig {
    /// Load configuration from `MUZEER_*` environment variables
    ///
    /// # Environment Variables
    /// - `MUZEER_BIND_ADDRESS` (default: "0.0.0.0:3000")
    /// - `MUZEER_PUBLIC_BASE_URL` (default: "")
    /// - `MUZEER_YTDLP_PATH` (default: "yt-dlp")
    /// - `MUZEER_TRENDING_PLAYLIST_URL` (default: YouTube "Top 100 Songs Global" chart)
    /// - `MUZEER_UPSTREAM_USER_AGENT` (default: desktop Chrome)
    /// - `MUZEER_UPSTREAM_REFERER` (default: "https://www.youtube.com/")
    /// - `MUZEER_CORS_ORIGIN` (default: "http://localhost:5173")
    pub fn from_env() -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("public_base_url", "")?
            .set_default("ytdlp_path", "yt-dlp")?
            .set_default(
                "trending_playlist_url",
                "https://www.youtube.com/playlist?list=PL4fGSI1pDJn6puJdseH2Rt9sMvt9E2M4i",
            )?
            .set_default("upstream_user_agent", DEFAULT_USER_AGENT)?
            .set_default("upstream_referer", "https://www.youtube.com/")?
            .set_default("cors_origin", "http://localhost:5173")?
            .add_source(::config::Environment::with_prefix("MUZEER"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// Base URL for proxy links, without a trailing slash
    pub fn proxy_base(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }
}
