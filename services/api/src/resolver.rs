//! Media resolution backed by yt-dlp
//!
//! The resolver turns search terms, page URLs and opaque video ids into
//! track metadata and direct audio URLs. Everything behind the
//! [`MediaResolver`] trait is treated as a black box by the rest of the
//! service, which keeps handlers testable without the external tool.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

/// Errors raised while talking to the media extraction tool
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The extractor process could not be started
    #[error("Failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),

    /// The extractor exited unsuccessfully
    #[error("yt-dlp failed: {0}")]
    Failed(String),

    /// The extractor output was not the expected JSON document
    #[error("Failed to parse yt-dlp output: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Metadata for a single media item or a collection of them, as emitted by
/// `yt-dlp --dump-single-json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    /// Direct media URL for the selected format
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    /// Present when the document describes a playlist or search result
    pub entries: Option<Vec<Option<MediaInfo>>>,
}

impl MediaInfo {
    /// Whether the document names a collection rather than a single item
    pub fn is_collection(&self) -> bool {
        self.entries.is_some()
    }

    /// Consume the document and return its entries, skipping unavailable ones
    pub fn into_entries(self) -> Vec<MediaInfo> {
        self.entries.unwrap_or_default().into_iter().flatten().collect()
    }

    /// Consume the document, yielding its members or the item itself
    pub fn into_items(self) -> Vec<MediaInfo> {
        if self.is_collection() {
            self.into_entries()
        } else {
            vec![self]
        }
    }
}

/// Resolves search queries, URLs and opaque ids into media metadata
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Keyword search returning at most `limit` results
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MediaInfo>, ResolveError>;

    /// Resolve a page URL; collections yield one item per member
    async fn resolve_url(&self, url: &str) -> Result<Vec<MediaInfo>, ResolveError>;

    /// Direct audio URL for an opaque video id, if one is playable
    async fn audio_url(&self, video_id: &str) -> Result<Option<String>, ResolveError>;

    /// Shallow listing of a playlist without per-item resolution
    async fn flat_playlist(&self, url: &str, limit: usize)
    -> Result<Vec<MediaInfo>, ResolveError>;
}

/// Watch page for an opaque YouTube video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// [`MediaResolver`] that shells out to the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: String,
}

impl YtDlpResolver {
    /// Create a resolver using the given executable path
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run yt-dlp with `args` followed by `target` and parse its JSON dump
    async fn dump_json(&self, args: &[&str], target: &str) -> Result<MediaInfo, ResolveError> {
        debug!("Running {} {:?} {}", self.binary, args, target);

        let output = Command::new(&self.binary)
            .args(["--dump-single-json", "--no-warnings", "--no-progress"])
            .args(args)
            .arg("--")
            .arg(target)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("yt-dlp failed for {} ({}): {}", target, output.status, stderr);
            return Err(ResolveError::Failed(stderr));
        }

        let info = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MediaInfo>, ResolveError> {
        let target = format!("ytsearch{}:{}", limit, query);
        let info = self
            .dump_json(&["-f", "bestaudio/best", "--no-playlist"], &target)
            .await?;

        Ok(info.into_entries().into_iter().take(limit).collect())
    }

    async fn resolve_url(&self, url: &str) -> Result<Vec<MediaInfo>, ResolveError> {
        let info = self
            .dump_json(&["-f", "bestaudio/best", "--no-playlist"], url)
            .await?;

        Ok(info.into_items())
    }

    async fn audio_url(&self, video_id: &str) -> Result<Option<String>, ResolveError> {
        let info = self
            .dump_json(&["-f", "bestaudio/best", "--no-playlist"], &watch_url(video_id))
            .await?;

        Ok(info.url.filter(|url| !url.trim().is_empty()))
    }

    async fn flat_playlist(
        &self,
        url: &str,
        limit: usize,
    ) -> Result<Vec<MediaInfo>, ResolveError> {
        let end = limit.to_string();
        let info = self
            .dump_json(&["--flat-playlist", "--playlist-end", &end], url)
            .await?;

        Ok(info.into_entries().into_iter().take(limit).collect())
    }
}
