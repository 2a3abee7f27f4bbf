//! Trending list built from a curated playlist

use tracing::{info, warn};

use crate::{
    models::track::TrendingTrack,
    resolver::{MediaResolver, watch_url},
    tracks::UNKNOWN_ARTIST,
};

/// Number of trending entries returned
pub const TRENDING_LIMIT: usize = 8;

/// Thumbnail derived from a video id
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// Fetch the trending list; any failure yields an empty list
pub async fn trending_tracks(resolver: &dyn MediaResolver, playlist_url: &str) -> Vec<TrendingTrack> {
    let entries = match resolver.flat_playlist(playlist_url, TRENDING_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to load trending playlist: {}", e);
            return Vec::new();
        }
    };

    let tracks: Vec<TrendingTrack> = entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.id.filter(|id| !id.is_empty())?;
            Some(TrendingTrack {
                title: entry.title.unwrap_or_default(),
                artist: entry
                    .uploader
                    .or(entry.channel)
                    .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                thumbnail: thumbnail_url(&id),
                webpage_url: watch_url(&id),
                id,
            })
        })
        .take(TRENDING_LIMIT)
        .collect();

    info!("Loaded {} trending tracks", tracks.len());
    tracks
}
