use regex::{Captures, Regex};
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Deployment settings that must be present before the service starts serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Env(#[from] envy::Error),

    #[error("Unresolved template variable '{{{{{key}}}}}' in config value '{value}'")]
    UnresolvedTemplate { key: String, value: String },

    #[error("Invalid URL in {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: oauth2::url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    pub database_url: String,

    // Spotify app credentials
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub spotify_scopes: String,

    #[serde(default = "default_spotify_accounts_url")]
    pub spotify_accounts_url: String,

    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    // Frontend
    pub frontend_admin_url: String,
    pub frontend_origin: String,

    // Admin auth
    pub admin_username: String,
    pub admin_password: String,
    pub admin_jwt_secret: String,

    // Playlist metadata, `{{KEY}}` placeholders resolved at startup
    pub playlist_title_template: String,
    pub playlist_description_template: String,

    #[serde(default)]
    pub playlist_cover_image_url: String,

    #[serde(default = "default_rust_log")]
    pub rust_log: String,

    #[serde(default = "default_log_format")]
    pub rust_log_format: String,
}

/// Playlist name and description after template resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_rust_log() -> String {
    "info,crowdlist=debug".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env::<Config>()?)
    }

    /// Resolve the playlist templates against `lookup`.
    ///
    /// Called once at startup with the process environment so that a missing
    /// placeholder stops the process instead of failing a request later.
    pub fn playlist_metadata<F>(&self, lookup: F) -> Result<PlaylistMetadata, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(PlaylistMetadata {
            title: resolve_template(&self.playlist_title_template, &lookup)?,
            description: resolve_template(&self.playlist_description_template, &lookup)?,
            cover_image_url: self.playlist_cover_image_url.clone(),
        })
    }
}

const MAX_TEMPLATE_PASSES: usize = 3;

static TEMPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("template pattern is a valid regex")
});

/// Replace `{{KEY}}` placeholders, re-expanding substituted values up to
/// three times.
pub fn resolve_template<F>(value: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut current = value.to_string();

    for _ in 0..MAX_TEMPLATE_PASSES {
        let mut missing: Option<String> = None;
        let next = TEMPLATE_PATTERN
            .replace_all(&current, |caps: &Captures| match lookup(&caps[1]) {
                Some(resolved) => resolved,
                None => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            })
            .into_owned();

        if let Some(key) = missing {
            return Err(ConfigError::UnresolvedTemplate {
                key,
                value: value.to_string(),
            });
        }

        if next == current {
            break;
        }
        current = next;
    }

    Ok(current)
}

#[cfg(test)]
pub(crate) fn test_config(spotify_base: &str) -> Config {
    Config {
        port: 3000,
        host: "0.0.0.0".to_string(),
        database_url: "postgresql://localhost/test".to_string(),
        spotify_client_id: "test_client_id".to_string(),
        spotify_client_secret: "test_client_secret".to_string(),
        spotify_redirect_uri: "http://localhost:3000/admin/spotify/callback".to_string(),
        spotify_scopes: "playlist-modify-private playlist-modify-public".to_string(),
        spotify_accounts_url: spotify_base.to_string(),
        spotify_api_url: spotify_base.to_string(),
        frontend_admin_url: "http://localhost:5173/admin".to_string(),
        frontend_origin: "http://localhost:5173".to_string(),
        admin_username: "admin".to_string(),
        admin_password: "hunter2".to_string(),
        admin_jwt_secret: "test_session_secret".to_string(),
        playlist_title_template: "Crowdlist".to_string(),
        playlist_description_template: "Songs picked by the group".to_string(),
        playlist_cover_image_url: String::new(),
        rust_log: "info".to_string(),
        rust_log_format: "pretty".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_template_plain_value() {
        let result = resolve_template("Friday Mix", lookup_from(&[])).unwrap();
        assert_eq!(result, "Friday Mix");
    }

    #[test]
    fn test_resolve_template_single_placeholder() {
        let lookup = lookup_from(&[("SILO_NAME", "Band Camp")]);
        let result = resolve_template("{{SILO_NAME}} Playlist", lookup).unwrap();
        assert_eq!(result, "Band Camp Playlist");
    }

    #[test]
    fn test_resolve_template_nested_placeholder() {
        let lookup = lookup_from(&[("SILO_NAME", "{{TEAM}} crew"), ("TEAM", "Ops")]);
        let result = resolve_template("{{SILO_NAME}}!", lookup).unwrap();
        assert_eq!(result, "Ops crew!");
    }

    #[test]
    fn test_resolve_template_missing_key() {
        let result = resolve_template("{{NOPE}} list", lookup_from(&[]));
        match result {
            Err(ConfigError::UnresolvedTemplate { key, value }) => {
                assert_eq!(key, "NOPE");
                assert_eq!(value, "{{NOPE}} list");
            }
            other => panic!("Expected UnresolvedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_template_ignores_lowercase() {
        let result = resolve_template("{{not_a_key}}", lookup_from(&[])).unwrap();
        assert_eq!(result, "{{not_a_key}}");
    }

    #[test]
    fn test_playlist_metadata() {
        let mut config = test_config("http://localhost");
        config.playlist_title_template = "{{SILO_NAME}} Jams".to_string();
        config.playlist_description_template = "Shared by {{SILO_NAME}}".to_string();
        config.playlist_cover_image_url = "https://img.example/cover.png".to_string();

        let metadata = config
            .playlist_metadata(lookup_from(&[("SILO_NAME", "Studio 4")]))
            .unwrap();

        assert_eq!(metadata.title, "Studio 4 Jams");
        assert_eq!(metadata.description, "Shared by Studio 4");
        assert_eq!(metadata.cover_image_url, "https://img.example/cover.png");
    }
}
