use crate::config::PlaylistMetadata;
use crate::db::LinkStore;
use crate::spotify::client::SpotifyClient;
use crate::spotify::token::expiry_from;
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;

/// Query parameters Spotify sends to the OAuth callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Result of one pass through the link flow.
///
/// Each failure names the step of the handshake that went wrong so the admin
/// page can show a specific message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success,
    /// Spotify redirected back with an `error` parameter.
    ErrorPassthrough(String),
    MissingCodeOrState,
    /// `state` does not match the stored link record.
    InvalidState,
    MissingTokens,
    NoUserId,
    NoPlaylistId,
    AuthError(String),
    ApiError(String),
}

impl CallbackOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            CallbackOutcome::Success => "success",
            CallbackOutcome::ErrorPassthrough(_) => "error_passthrough",
            CallbackOutcome::MissingCodeOrState => "missing_code_or_state",
            CallbackOutcome::InvalidState => "invalid_state",
            CallbackOutcome::MissingTokens => "missing_tokens",
            CallbackOutcome::NoUserId => "no_user_id",
            CallbackOutcome::NoPlaylistId => "no_playlist_id",
            CallbackOutcome::AuthError(_) => "auth_error",
            CallbackOutcome::ApiError(_) => "api_error",
        }
    }

    /// Admin frontend URL with the outcome appended as a query parameter.
    pub fn redirect_url(&self, frontend_admin_url: &Url) -> Url {
        let mut url = frontend_admin_url.clone();
        {
            let mut query = url.query_pairs_mut();
            match self {
                CallbackOutcome::Success => query.append_pair("spotify_connected", "1"),
                CallbackOutcome::ErrorPassthrough(error) => {
                    query.append_pair("spotify_error", error)
                }
                other => query.append_pair("spotify_error", other.tag()),
            };
        }
        url
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Complete the authorization-code flow.
///
/// Steps, each short-circuiting with its own outcome:
/// 1. Spotify-reported `error` is passed through before anything else
/// 2. `code` and `state` must both be present
/// 3. `state` must be the ID of the stored link record
/// 4. Exchange the code; both tokens must be present
/// 5. Persist the tokens
/// 6. If no playlist is linked yet, create one under the authorizing user
///
/// # Errors
/// Only storage failures are returned as errors; every Spotify failure is an
/// outcome.
pub async fn handle_callback(
    links: &dyn LinkStore,
    spotify: &SpotifyClient,
    playlist: &PlaylistMetadata,
    params: CallbackParams,
) -> Result<CallbackOutcome, sqlx::Error> {
    if let Some(error) = non_empty(params.error) {
        tracing::warn!(error = %error, "Spotify authorization returned an error");
        return Ok(CallbackOutcome::ErrorPassthrough(error));
    }

    let (Some(code), Some(state)) = (non_empty(params.code), non_empty(params.state)) else {
        tracing::warn!("Spotify callback missing code or state");
        return Ok(CallbackOutcome::MissingCodeOrState);
    };

    let Some(link) = links
        .get_link()
        .await?
        .filter(|link| link.id.to_string() == state)
    else {
        tracing::warn!("Spotify callback state does not match the playlist link");
        return Ok(CallbackOutcome::InvalidState);
    };

    let now = Utc::now();
    let grant = match spotify.exchange_code(&code).await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::error!(link_id = %link.id, error = %e, "Authorization code exchange failed");
            return Ok(CallbackOutcome::AuthError(e.to_string()));
        }
    };

    let (Some(access_token), Some(refresh_token)) =
        (non_empty(grant.access_token), non_empty(grant.refresh_token))
    else {
        tracing::error!(link_id = %link.id, "Token exchange response missing tokens");
        return Ok(CallbackOutcome::MissingTokens);
    };

    let expires_at = match expiry_from(now, grant.expires_in, "Token exchange") {
        Ok(expires_at) => expires_at,
        Err(e) => {
            tracing::error!(link_id = %link.id, error = %e, "Token exchange returned invalid expiry");
            return Ok(CallbackOutcome::AuthError(e.to_string()));
        }
    };

    let link = links
        .store_linked_tokens(link.id, &access_token, &refresh_token, expires_at)
        .await?;

    tracing::info!(link_id = %link.id, "Stored Spotify tokens for playlist link");

    if link.spotify_playlist_id.is_some() {
        return Ok(CallbackOutcome::Success);
    }

    let profile = match spotify.get_profile(&access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(link_id = %link.id, error = %e, "Failed to fetch Spotify profile");
            return Ok(CallbackOutcome::ApiError(e.to_string()));
        }
    };

    let Some(user_id) = non_empty(profile.id) else {
        tracing::error!(link_id = %link.id, "Spotify profile has no user id");
        return Ok(CallbackOutcome::NoUserId);
    };

    let created = match spotify
        .create_playlist(
            &access_token,
            &user_id,
            &playlist.title,
            &playlist.description,
        )
        .await
    {
        Ok(created) => created,
        Err(e) => {
            tracing::error!(link_id = %link.id, error = %e, "Failed to create Spotify playlist");
            return Ok(CallbackOutcome::ApiError(e.to_string()));
        }
    };

    let Some(playlist_id) = non_empty(created.id) else {
        tracing::error!(link_id = %link.id, "Created playlist response has no id");
        return Ok(CallbackOutcome::NoPlaylistId);
    };

    links.set_playlist_id(link.id, &playlist_id).await?;

    tracing::info!(
        link_id = %link.id,
        spotify_user_id = %user_id,
        spotify_playlist_id = %playlist_id,
        "Linked new Spotify playlist"
    );

    Ok(CallbackOutcome::Success)
}
