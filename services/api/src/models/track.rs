//! Track payloads returned by search and trending

use serde::{Deserialize, Serialize};

/// A playable search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPayload {
    pub title: String,
    pub artist: String,
    pub webpage_url: String,
    pub thumbnail: String,
    /// Direct upstream audio URL when the resolver already produced one
    pub audio_url: String,
    /// Route back through the audio relay
    pub proxy_url: String,
    /// Length in whole seconds, 0 when unknown
    pub duration: u64,
}

/// A summary entry of the trending list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTrack {
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub webpage_url: String,
    pub id: String,
}
