//! API service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::{
    AppState, accounts,
    error::{ApiError, ApiResult},
    models::{ListeningResponse, RegisterRequest, RegisterResponse, SearchRequest, StreamQuery},
    relay::StreamRequest,
    tracks, trending,
    validation::required,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/search", post(search))
        .route("/api/stream", get(stream_audio))
        .route("/api/trending", get(get_trending))
        .route("/api/bot/listening/:platform_id", get(get_listening))
        .route("/register", post(register))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_LENGTH,
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
        ]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            layer
        }
    }
}

/// Unwrap a JSON body, treating an absent or unreadable body as empty
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Treating request body as empty: {}", rejection);
            T::default()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Search tracks by keyword or resolve a URL
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let payload = body_or_default(payload);
    let query = required(payload.query.as_deref())
        .ok_or_else(|| ApiError::InvalidRequest("Missing query".to_string()))?;

    let tracks = tracks::search_tracks(state.resolver.as_ref(), query, state.config.proxy_base())
        .await
        .map_err(|e| {
            error!("Search failed for {:?}: {}", query, e);
            ApiError::ResolutionFailed(e.to_string())
        })?;

    Ok(Json(tracks))
}

/// Relay the audio of a resolved track, honoring `Range`
pub async fn stream_audio(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let request = StreamRequest {
        vid: query.vid,
        range: headers.get(header::RANGE).cloned(),
    };

    state.relay.stream(state.resolver.as_ref(), request).await
}

/// Trending tracks; always succeeds
pub async fn get_trending(State(state): State<AppState>) -> impl IntoResponse {
    Json(
        trending::trending_tracks(state.resolver.as_ref(), &state.config.trending_playlist_url)
            .await,
    )
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let payload = body_or_default(payload);
    accounts::register(state.user_store.as_ref(), &payload)
        .await
        .inspect_err(|e| info!("Registration failed: {}", e))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            ok: true,
            message: "User created successfully".to_string(),
        }),
    ))
}

/// What the user linked to a Discord account is listening to
pub async fn get_listening(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
) -> ApiResult<Response> {
    let user = state
        .user_store
        .find_by_discord_id(&platform_id)
        .await
        .map_err(|e| {
            error!("Failed to look up linked user: {}", e);
            ApiError::Database(e)
        })?;

    let Some(user) = user else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User has not linked their Muzeer account." })),
        )
            .into_response());
    };

    Ok(Json(ListeningResponse {
        user_name: user.user_name,
        discord_name: user.discord_name,
        presence: user.presence,
    })
    .into_response())
}
