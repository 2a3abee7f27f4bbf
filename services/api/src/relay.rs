//! Range-aware audio relay
//!
//! Streams third-party audio bytes to the client without buffering the
//! payload. The client's `Range` header is forwarded upstream so players can
//! seek, the upstream status code is relayed verbatim, and only an explicit
//! allow-list of response headers crosses the proxy boundary.
//!
//! Each relay call owns its upstream response through the body stream. The
//! connection is released when that stream is dropped: on completion, on an
//! upstream error, or when the client goes away.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::Response,
};
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    resolver::MediaResolver,
    validation::validate_video_id,
};

/// Upper bound on the size of each body chunk sent to the client
pub const RELAY_CHUNK_SIZE: usize = 8 * 1024;

/// Upstream response headers copied to the client; everything else is dropped
pub const FORWARDED_HEADERS: [HeaderName; 5] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::CACHE_CONTROL,
];

/// A single client stream request
#[derive(Debug, Clone, Default)]
pub struct StreamRequest {
    /// Opaque video id to resolve
    pub vid: Option<String>,
    /// Client `Range` header, forwarded unchanged
    pub range: Option<HeaderValue>,
}

/// HTTP relay between the media host and the client
#[derive(Clone)]
pub struct Relay {
    client: reqwest::Client,
    user_agent: String,
    referer: String,
}

impl Relay {
    /// Create a relay sending the given `User-Agent` and `Referer` upstream
    pub fn new(
        client: reqwest::Client,
        user_agent: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            referer: referer.into(),
        }
    }

    /// Resolve the request's video id and relay the upstream audio
    ///
    /// Fails with `InvalidRequest` before touching the resolver when the id
    /// is missing or malformed, and with `ResolutionFailed` when no playable
    /// URL comes back.
    pub async fn stream(
        &self,
        resolver: &dyn MediaResolver,
        request: StreamRequest,
    ) -> ApiResult<Response> {
        let vid = validate_video_id(request.vid.as_deref()).map_err(ApiError::InvalidRequest)?;

        let upstream_url = resolver
            .audio_url(vid)
            .await
            .map_err(|e| {
                error!("Failed to resolve audio for {}: {}", vid, e);
                ApiError::ResolutionFailed("Failed to resolve audio stream".to_string())
            })?
            .ok_or_else(|| {
                warn!("No playable audio URL for {}", vid);
                ApiError::ResolutionFailed("No playable audio URL".to_string())
            })?;

        self.relay(&upstream_url, request.range.as_ref()).await
    }

    /// Open `upstream_url` and stream its response back verbatim
    pub async fn relay(
        &self,
        upstream_url: &str,
        range: Option<&HeaderValue>,
    ) -> ApiResult<Response> {
        let mut request = self
            .client
            .get(upstream_url)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::REFERER, &self.referer);

        if let Some(range) = range {
            request = request.header(header::RANGE, range.clone());
        }

        let upstream = request.send().await.map_err(|e| {
            error!("Upstream request failed: {}", e);
            ApiError::Unreachable(e.to_string())
        })?;

        let status = upstream.status();
        let headers = forwarded_headers(upstream.headers());
        info!(
            "Relaying upstream audio: status={}, range={:?}, length={:?}",
            status,
            range,
            headers.get(header::CONTENT_LENGTH)
        );

        let mut response = Response::new(Body::from_stream(rechunk(upstream.bytes_stream())));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Copy the allow-listed headers out of an upstream response
pub fn forwarded_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        for value in upstream.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Split a buffer into pieces of at most [`RELAY_CHUNK_SIZE`] bytes
pub fn split_chunks(mut bytes: Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len().div_ceil(RELAY_CHUNK_SIZE));
    while bytes.len() > RELAY_CHUNK_SIZE {
        chunks.push(bytes.split_to(RELAY_CHUNK_SIZE));
    }
    if !bytes.is_empty() {
        chunks.push(bytes);
    }
    chunks
}

/// Re-slice an upstream byte stream into bounded chunks
///
/// An upstream error is passed through as the final item, which makes the
/// server abort the client connection. Nothing is retried.
fn rechunk<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: std::fmt::Display + Send,
{
    upstream.flat_map(|item| {
        let pieces: Vec<Result<Bytes, E>> = match item {
            Ok(bytes) => split_chunks(bytes).into_iter().map(Ok).collect(),
            Err(e) => {
                warn!("Upstream transfer aborted: {}", e);
                vec![Err(e)]
            }
        };
        stream::iter(pieces)
    })
}
