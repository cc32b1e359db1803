use regex::Regex;
use std::sync::LazyLock;

static TRACK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://open\.spotify\.com/(?:intl-[a-z]{2}/)?track/([a-zA-Z0-9]+)")
        .expect("track URL pattern is a valid regex")
});

static TRACK_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spotify:track:([a-zA-Z0-9]+)").expect("track URI pattern is a valid regex")
});

/// Extract Spotify track ID from a URL or URI
///
/// Supports:
/// - https://open.spotify.com/track/TRACK_ID
/// - https://open.spotify.com/intl-de/track/TRACK_ID?si=...
/// - spotify:track:TRACK_ID
///
/// # Examples
/// ```
/// use crowdlist::spotify::parser::extract_track_id;
///
/// let url = "https://open.spotify.com/track/3n3Ppam7vgaVa1iaRUc9Lp?si=abc";
/// assert_eq!(extract_track_id(url), Some("3n3Ppam7vgaVa1iaRUc9Lp".to_string()));
/// ```
pub fn extract_track_id(text: &str) -> Option<String> {
    if let Some(captures) = TRACK_URL.captures(text) {
        return Some(captures[1].to_string());
    }

    TRACK_URI
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Normalise user input to a track ID.
///
/// A share link or `spotify:track:` URI is reduced to its ID. Anything else
/// is an opaque ID and only trimmed.
pub fn normalize_track_id(input: &str) -> String {
    let input = input.trim();
    extract_track_id(input).unwrap_or_else(|| input.to_string())
}

/// `spotify:track:<id>`
pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}
