//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate an opaque video id and return it trimmed
pub fn validate_video_id(vid: Option<&str>) -> Result<&str, String> {
    let vid = vid.map(str::trim).unwrap_or_default();

    if vid.is_empty() {
        return Err("Missing vid".to_string());
    }

    static VIDEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = VIDEO_ID_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("Failed to compile vid regex"));

    if !regex.is_match(vid) {
        return Err("Invalid vid".to_string());
    }

    Ok(vid)
}

/// Return the trimmed value if it is present and not blank
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Lower-case and trim an email for storage and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
