use crate::config::{Config, ConfigError};
use crate::spotify::error::{ApiError, AuthError};
use crate::spotify::models::{
    AddTracksRequest, CreatePlaylistRequest, CreatedPlaylist, TokenGrant, UserProfile,
};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl, basic::BasicClient,
};
use reqwest::{Response, StatusCode};
use std::time::Duration;

/// Deadline for every outbound Spotify call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Spotify caps search page size at 50.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Credentials and endpoints for the Spotify app.
#[derive(Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: String,
    pub accounts_url: String,
    pub api_url: String,
}

impl SpotifySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: config.spotify_scopes.clone(),
            accounts_url: config.spotify_accounts_url.trim_end_matches('/').to_string(),
            api_url: config.spotify_api_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Thin wrapper around the Spotify accounts service and Web API.
///
/// Holds no credential state: every call that needs authorization takes the
/// access token as an argument. Each method issues exactly one request and
/// never retries.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    oauth: BasicClient,
    token_url: String,
    settings: SpotifySettings,
}

impl SpotifyClient {
    /// Build the client, validating the configured URLs.
    ///
    /// # Errors
    /// - `InvalidUrl` if the accounts URL or redirect URI cannot be parsed
    /// - `HttpClient` if the HTTP client cannot be constructed
    pub fn new(settings: SpotifySettings) -> Result<Self, ConfigError> {
        let auth_url = AuthUrl::new(format!("{}/authorize", settings.accounts_url)).map_err(
            |source| ConfigError::InvalidUrl {
                field: "SPOTIFY_ACCOUNTS_URL",
                source,
            },
        )?;

        let token_url = format!("{}/api/token", settings.accounts_url);
        let oauth_token_url =
            TokenUrl::new(token_url.clone()).map_err(|source| ConfigError::InvalidUrl {
                field: "SPOTIFY_ACCOUNTS_URL",
                source,
            })?;

        let redirect_url = RedirectUrl::new(settings.redirect_uri.clone()).map_err(|source| {
            ConfigError::InvalidUrl {
                field: "SPOTIFY_REDIRECT_URI",
                source,
            }
        })?;

        let oauth = BasicClient::new(
            ClientId::new(settings.client_id.clone()),
            Some(ClientSecret::new(settings.client_secret.clone())),
            auth_url,
            Some(oauth_token_url),
        )
        .set_redirect_uri(redirect_url);

        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            http,
            oauth,
            token_url,
            settings,
        })
    }

    /// Build the URL the admin is sent to in order to grant access.
    ///
    /// Pure string templating, no network call. `state` is echoed back by
    /// Spotify on the callback.
    pub fn build_authorize_url(&self, state: &str) -> String {
        let scopes = self
            .settings
            .scopes
            .split_whitespace()
            .map(|scope| Scope::new(scope.to_string()));

        let (url, _csrf_token) = self
            .oauth
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(scopes)
            .add_extra_param("show_dialog", "true")
            .url();

        url.to_string()
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// # Errors
    /// - `AuthError::Rejected` on a non-2xx response
    /// - `AuthError::Request` on network failure or an unreadable body
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        tracing::info!("Exchanging Spotify authorization code for tokens");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        self.token_request("Token exchange", &form).await
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        tracing::info!("Refreshing Spotify access token");

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        self.token_request("Refresh", &form).await
    }

    // Posted with reqwest rather than through `oauth2` so a rejection keeps
    // its HTTP status and body.
    async fn token_request(
        &self,
        operation: &'static str,
        form: &[(&str, &str)],
    ) -> Result<TokenGrant, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|source| {
                tracing::error!(operation, error = ?source, "Spotify token request failed");
                AuthError::Request { operation, source }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                operation,
                status = status.as_u16(),
                "Spotify rejected token request"
            );
            return Err(AuthError::Rejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }

    /// Fetch the profile of the user that owns `access_token`.
    pub async fn get_profile(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let operation = "Get profile";
        let response = self
            .http
            .get(format!("{}/me", self.settings.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| ApiError::Request { operation, source })?;

        let response = check_status(operation, response, &[StatusCode::OK]).await?;
        response
            .json::<UserProfile>()
            .await
            .map_err(|source| ApiError::Request { operation, source })
    }

    /// Create a private playlist owned by `user_id`.
    pub async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, ApiError> {
        let operation = "Create playlist";
        tracing::info!(user_id, name, "Creating Spotify playlist");

        let response = self
            .http
            .post(format!("{}/users/{}/playlists", self.settings.api_url, user_id))
            .bearer_auth(access_token)
            .json(&CreatePlaylistRequest {
                name,
                description,
                public: false,
            })
            .send()
            .await
            .map_err(|source| ApiError::Request { operation, source })?;

        let response =
            check_status(operation, response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        response
            .json::<CreatedPlaylist>()
            .await
            .map_err(|source| ApiError::Request { operation, source })
    }

    /// Append a single track to a playlist.
    pub async fn add_track(
        &self,
        access_token: &str,
        playlist_id: &str,
        track_uri: &str,
    ) -> Result<(), ApiError> {
        let operation = "Add track";
        tracing::debug!(playlist_id, track_uri, "Adding track to Spotify playlist");

        let response = self
            .http
            .post(format!(
                "{}/playlists/{}/tracks",
                self.settings.api_url, playlist_id
            ))
            .bearer_auth(access_token)
            .json(&AddTracksRequest { uris: [track_uri] })
            .send()
            .await
            .map_err(|source| ApiError::Request { operation, source })?;

        check_status(operation, response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        Ok(())
    }

    /// Search the catalogue for tracks, returning Spotify's response as-is.
    pub async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<serde_json::Value, ApiError> {
        let operation = "Spotify search";
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();

        let response = self
            .http
            .get(format!("{}/search", self.settings.api_url))
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|source| ApiError::Request { operation, source })?;

        let response = check_status(operation, response, &[StatusCode::OK]).await?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|source| ApiError::Request { operation, source })
    }
}

async fn check_status(
    operation: &'static str,
    response: Response,
    accepted: &[StatusCode],
) -> Result<Response, ApiError> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        operation,
        status = status.as_u16(),
        "Spotify API returned error"
    );

    Err(ApiError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}
