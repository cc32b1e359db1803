use serde::{Deserialize, Serialize};

/// Body of a token endpoint response.
///
/// Every field is optional so that callers can tell a malformed grant apart
/// from a rejected request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPlaylist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddTracksRequest<'a> {
    pub uris: [&'a str; 1],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_grant_full() {
        let json = r#"{
            "access_token": "BQD",
            "token_type": "Bearer",
            "scope": "playlist-modify-private",
            "expires_in": 3600,
            "refresh_token": "AQC"
        }"#;

        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("BQD"));
        assert_eq!(grant.refresh_token.as_deref(), Some("AQC"));
        assert_eq!(grant.expires_in, Some(3600));
    }

    #[test]
    fn test_token_grant_refresh_without_rotation() {
        let json = r#"{"access_token": "BQD", "token_type": "Bearer"}"#;

        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert!(grant.refresh_token.is_none());
        assert!(grant.expires_in.is_none());
    }

    #[test]
    fn test_add_tracks_request_shape() {
        let body = serde_json::to_value(AddTracksRequest {
            uris: ["spotify:track:abc"],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "uris": ["spotify:track:abc"] }));
    }
}
