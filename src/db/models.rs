use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The single row tying this deployment to one Spotify account and playlist.
///
/// `access_token` and `access_token_expires_at` are always written together.
/// `spotify_playlist_id` is never cleared once set.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlaylistLink {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub spotify_playlist_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PlaylistLink {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            refresh_token: None,
            access_token: None,
            access_token_expires_at: None,
            spotify_playlist_id: None,
            created_at: Utc::now(),
        }
    }

    /// A refresh token has been stored by the link flow.
    pub fn is_connected(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl Default for PlaylistLink {
    fn default() -> Self {
        Self::new()
    }
}

/// One member's suggested track. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub spotify_track_id: String,
    pub spotify_track_uri: Option<String>,
    pub title: String,
    pub artist: String,
    pub album_art_url: Option<String>,
    pub submitter: String,
    pub submitter_avatar_url: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the submitter; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub spotify_track_id: String,
    #[serde(default)]
    pub spotify_track_uri: Option<String>,
    #[serde(alias = "song")]
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album_art_url: Option<String>,
    #[serde(alias = "user")]
    pub submitter: String,
    #[serde(default, alias = "user_avatar_url")]
    pub submitter_avatar_url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}
