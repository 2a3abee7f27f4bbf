//! Test doubles shared by the unit tests: a scripted resolver, an in-memory
//! user store and a local media host that honors byte ranges.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use uuid::Uuid;

use crate::{
    config::{AppConfig, DEFAULT_USER_AGENT},
    models::user::{NewUser, User},
    relay::Relay,
    repositories::UserStore,
    resolver::{MediaInfo, MediaResolver, ResolveError},
    state::AppState,
};

/// Size of the sample file served by [`spawn_media_host`]
pub const AUDIO_LEN: usize = 20_000;

/// Resolver returning canned results and counting every call
#[derive(Default)]
pub struct MockResolver {
    audio_url: Option<String>,
    items: Vec<MediaInfo>,
    fail: bool,
    calls: AtomicUsize,
    last_call: Mutex<Option<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audio_url(mut self, url: String) -> Self {
        self.audio_url = Some(url);
        self
    }

    pub fn with_items(mut self, items: Vec<MediaInfo>) -> Self {
        self.items = items;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<String> {
        self.last_call.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(call);
        if self.fail {
            return Err(ResolveError::Failed("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MediaInfo>, ResolveError> {
        self.record(format!("search:{query}"))?;
        Ok(self.items.iter().take(limit).cloned().collect())
    }

    async fn resolve_url(&self, url: &str) -> Result<Vec<MediaInfo>, ResolveError> {
        self.record(format!("resolve_url:{url}"))?;
        Ok(self.items.clone())
    }

    async fn audio_url(&self, video_id: &str) -> Result<Option<String>, ResolveError> {
        self.record(format!("audio_url:{video_id}"))?;
        Ok(self.audio_url.clone())
    }

    async fn flat_playlist(
        &self,
        url: &str,
        limit: usize,
    ) -> Result<Vec<MediaInfo>, ResolveError> {
        self.record(format!("flat_playlist:{url}"))?;
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

/// Media item with just an id and a title
pub fn media_item(id: &str, title: &str) -> MediaInfo {
    MediaInfo {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        ..MediaInfo::default()
    }
}

/// User store keeping accounts in a map keyed by email
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.email.clone(), user);
    }

    pub fn get(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&new_user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            user_name: new_user.user_name.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            discord_id: None,
            discord_name: String::new(),
            presence: None,
            created_at: Utc::now(),
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self.get(email))
    }

    async fn find_by_discord_id(&self, discord_id: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.discord_id.as_deref() == Some(discord_id))
            .cloned())
    }
}

/// HTTP client for talking to local test servers
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build test client")
}

/// Configuration used by router tests
pub fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        public_base_url: String::new(),
        ytdlp_path: "yt-dlp".to_string(),
        trending_playlist_url: "https://www.youtube.com/playlist?list=PLtest".to_string(),
        upstream_user_agent: DEFAULT_USER_AGENT.to_string(),
        upstream_referer: "https://www.youtube.com/".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
    }
}

/// Application state wired to test doubles
pub fn test_state(resolver: Arc<MockResolver>, store: Arc<InMemoryUserStore>) -> AppState {
    let config = test_config();
    let relay = Relay::new(
        test_client(),
        config.upstream_user_agent.clone(),
        config.upstream_referer.clone(),
    );

    AppState {
        config: Arc::new(config),
        resolver,
        relay,
        user_store: store,
    }
}

fn sample_audio() -> Vec<u8> {
    (0..AUDIO_LEN).map(|i| (i % 251) as u8).collect()
}

fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    let start = start.parse().ok()?;
    let end = if end.is_empty() {
        AUDIO_LEN - 1
    } else {
        end.parse::<usize>().ok()?.min(AUDIO_LEN - 1)
    };
    (start <= end).then_some((start, end))
}

async fn serve_audio(headers: HeaderMap) -> Response {
    let data = sample_audio();
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range);

    let common = [
        (header::CONTENT_TYPE, "audio/webm".to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CACHE_CONTROL, "private, max-age=21600".to_string()),
        (header::SET_COOKIE, "YSC=upstream; Path=/".to_string()),
    ];

    match range {
        Some((start, end)) => (
            StatusCode::PARTIAL_CONTENT,
            common,
            [
                (
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, AUDIO_LEN),
                ),
                (header::CONTENT_LENGTH, (end - start + 1).to_string()),
            ],
            data[start..=end].to_vec(),
        )
            .into_response(),
        None => (
            StatusCode::OK,
            common,
            [(header::CONTENT_LENGTH, AUDIO_LEN.to_string())],
            data,
        )
            .into_response(),
    }
}

async fn echo_identity(headers: HeaderMap) -> String {
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    format!("{}|{}", value(header::USER_AGENT), value(header::REFERER))
}

/// Start a local media host and return its base URL
///
/// `/audio.webm` serves [`AUDIO_LEN`] bytes with range support and a few
/// headers the relay must not forward; `/identity` echoes the caller's
/// `User-Agent` and `Referer` as `ua|referer`; `/forbidden` always answers 403.
pub async fn spawn_media_host() -> String {
    let app = Router::new()
        .route("/audio.webm", get(serve_audio))
        .route("/identity", get(echo_identity))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind media host");
    let addr = listener.local_addr().expect("media host has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

/// Start a host that promises [`AUDIO_LEN`] bytes, sends 100 and hangs up
pub async fn spawn_truncating_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncating host");
    let addr = listener.local_addr().expect("truncating host has no address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            if socket.read(&mut request).await.is_err() {
                continue;
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: audio/webm\r\nContent-Length: {}\r\n\r\n",
                AUDIO_LEN
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&sample_audio()[..100]).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/audio.webm", addr)
}
