//! Field parsing for row and overlay values.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Regex Patterns
// ============================================================================

/// Avatar CDN path: `/avatars/<id>/<hash>.<ext>`
static AVATAR_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/avatars/(\d{5,})/")
        .expect("Invalid regex")
});

/// Profile link: `/users/<id>`
static PROFILE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/users/(\d{5,})(?:[/?#]|$)")
        .expect("Invalid regex")
});

/// Extracts the account id embedded in an avatar URL.
///
/// Default avatars (`/embed/avatars/N.png`) carry no id and yield `None`.
pub fn user_id_from_avatar(url: &str) -> Option<String> {
    AVATAR_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts the account id from a profile link.
pub fn user_id_from_profile_href(href: &str) -> Option<String> {
    PROFILE_ID_RE
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Trims a scraped value, mapping blank strings to `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
