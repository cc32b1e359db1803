use crate::config::{Config, ConfigError, PlaylistMetadata};
use crate::db::{LinkStore, SubmissionStore};
use crate::spotify::client::SpotifyClient;
use reqwest::Url;
use std::sync::Arc;

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub playlist: Arc<PlaylistMetadata>,
    pub frontend_admin_url: Url,
    pub spotify: SpotifyClient,
    pub links: Arc<dyn LinkStore>,
    pub submissions: Arc<dyn SubmissionStore>,
}

impl AppState {
    /// # Errors
    /// Returns `InvalidUrl` if `FRONTEND_ADMIN_URL` cannot be parsed.
    pub fn new(
        config: Config,
        playlist: PlaylistMetadata,
        spotify: SpotifyClient,
        links: Arc<dyn LinkStore>,
        submissions: Arc<dyn SubmissionStore>,
    ) -> Result<Self, ConfigError> {
        let frontend_admin_url =
            Url::parse(&config.frontend_admin_url).map_err(|source| ConfigError::InvalidUrl {
                field: "FRONTEND_ADMIN_URL",
                source,
            })?;

        Ok(Self {
            config: Arc::new(config),
            playlist: Arc::new(playlist),
            frontend_admin_url,
            spotify,
            links,
            submissions,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::test_config;
    use crate::db::MemoryStore;
    use crate::spotify::client::SpotifySettings;

    /// State backed by an in-memory store, talking to Spotify at `spotify_base`.
    pub fn test_state(spotify_base: &str) -> (AppState, MemoryStore) {
        let config = test_config(spotify_base);
        let playlist = config
            .playlist_metadata(|_| None)
            .expect("test templates have no placeholders");
        let spotify = SpotifyClient::new(SpotifySettings::from_config(&config))
            .expect("test Spotify settings are valid");
        let store = MemoryStore::new();

        let state = AppState::new(
            config,
            playlist,
            spotify,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
        .expect("test frontend URL is valid");

        (state, store)
    }
}
