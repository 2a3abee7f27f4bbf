//! Track search: shapes resolver results into client payloads

use tracing::debug;

use crate::{
    models::track::TrackPayload,
    resolver::{MediaInfo, MediaResolver, ResolveError},
};

/// Maximum number of keyword search results returned
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Fallback artist when the resolver knows neither uploader nor channel
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Whether the query should be resolved as a URL instead of searched
pub fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

/// Relay route for an opaque video id
pub fn proxy_url(base: &str, video_id: &str) -> String {
    format!("{}/api/stream?vid={}", base, urlencoding::encode(video_id))
}

/// Shape one resolver result; items without an id cannot be relayed and
/// are dropped
pub fn track_payload(info: MediaInfo, query: &str, base: &str) -> Option<TrackPayload> {
    let id = info.id.filter(|id| !id.is_empty())?;

    Some(TrackPayload {
        title: info.title.unwrap_or_else(|| query.to_string()),
        artist: info
            .uploader
            .or(info.channel)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        webpage_url: info.webpage_url.unwrap_or_default(),
        thumbnail: info.thumbnail.unwrap_or_default(),
        audio_url: info.url.unwrap_or_default(),
        proxy_url: proxy_url(base, &id),
        duration: info
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0),
    })
}

/// Search by keyword, or resolve the query directly when it is a URL
pub async fn search_tracks(
    resolver: &dyn MediaResolver,
    query: &str,
    base: &str,
) -> Result<Vec<TrackPayload>, ResolveError> {
    let items = if is_url(query) {
        resolver.resolve_url(query).await?
    } else {
        resolver.search(query, SEARCH_RESULT_LIMIT).await?
    };

    let found = items.len();
    let tracks: Vec<TrackPayload> = items
        .into_iter()
        .filter_map(|info| track_payload(info, query, base))
        .collect();

    debug!("Search for {:?} produced {} of {} items", query, tracks.len(), found);
    Ok(tracks)
}
