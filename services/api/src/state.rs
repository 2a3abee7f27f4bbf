//! Application state shared across handlers

use std::sync::Arc;

use crate::{config::AppConfig, relay::Relay, repositories::UserStore, resolver::MediaResolver};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<dyn MediaResolver>,
    pub relay: Relay,
    pub user_store: Arc<dyn UserStore>,
}
