//! Custom error types for the presence bridge

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the presence API
#[derive(Error, Debug)]
pub enum BotError {
    /// Connection, timeout or body decoding failure
    #[error("Presence API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any status other than 200 or 404
    #[error("Presence API returned status {0}")]
    UnexpectedStatus(StatusCode),
}
