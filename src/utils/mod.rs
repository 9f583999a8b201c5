use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::domain::{AppError, Shortcode};

static POST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?instagram\.com/(?:p|reel|tv)/([A-Za-z0-9_-]+)")
        .expect("post URL pattern is valid")
});

static BARE_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,}$").expect("shortcode pattern is valid"));

/// Get current Unix timestamp in seconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extract the post shortcode from a post/reel/tv URL or a bare shortcode.
///
/// A URL anywhere in the input wins over the bare form.
pub fn extract_shortcode(input: &str) -> Result<Shortcode, AppError> {
    let candidate = input.trim();

    if let Some(caps) = POST_URL.captures(candidate) {
        return Ok(Shortcode::new(&caps[1]));
    }

    if BARE_SHORTCODE.is_match(candidate) {
        return Ok(Shortcode::new(candidate));
    }

    Err(AppError::InvalidInput)
}
