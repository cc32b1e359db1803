use crate::db::LinkStore;
use crate::db::models::PlaylistLink;
use crate::spotify::client::SpotifyClient;
use crate::spotify::error::{AuthError, SpotifyError};
use chrono::{DateTime, Duration, Utc};

/// A cached token is only reused while it has more than this left.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Return the cached access token if it is still comfortably valid at `now`.
pub fn cached_access_token(link: &PlaylistLink, now: DateTime<Utc>) -> Option<&str> {
    let token = link.access_token.as_deref()?;
    let expires_at = link.access_token_expires_at?;

    if expires_at - now > Duration::seconds(REFRESH_MARGIN_SECS) {
        Some(token)
    } else {
        None
    }
}

/// Absolute expiry for a token that lives `expires_in` seconds from `now`.
///
/// # Errors
/// `AuthError::InvalidField` if the lifetime does not fit a timestamp.
pub fn expiry_from(
    now: DateTime<Utc>,
    expires_in: Option<i64>,
    operation: &'static str,
) -> Result<DateTime<Utc>, AuthError> {
    Duration::try_seconds(expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(AuthError::InvalidField {
            operation,
            field: "expires_in",
        })
}

/// Ensure a valid access token, refreshing if necessary
///
/// Reuses the cached token while it has more than a minute left. Otherwise
/// exchanges the stored refresh token and writes the new token and expiry
/// back to the link record before returning it. A failed refresh leaves the
/// cached values untouched.
///
/// # Errors
/// - `AuthError::NoRefreshToken` if the link flow has not completed
/// - `AuthError::Rejected` / `AuthError::Request` if the refresh call fails
/// - `AuthError::MissingField` if the response has no `access_token`
/// - `AuthError::InvalidField` if `expires_in` is out of range
/// - `Database` if the new token cannot be stored
pub async fn get_valid_access_token(
    links: &dyn LinkStore,
    spotify: &SpotifyClient,
    link: &PlaylistLink,
) -> Result<String, SpotifyError> {
    let refresh_token = link
        .refresh_token
        .as_deref()
        .ok_or(AuthError::NoRefreshToken)?;

    let now = Utc::now();
    if let Some(token) = cached_access_token(link, now) {
        tracing::debug!(
            link_id = %link.id,
            expires_at = ?link.access_token_expires_at,
            "Access token still valid, using cached token"
        );
        return Ok(token.to_string());
    }

    tracing::info!(
        link_id = %link.id,
        expires_at = ?link.access_token_expires_at,
        now = %now,
        "Access token missing or expiring soon, refreshing"
    );

    let grant = spotify.refresh_access_token(refresh_token).await?;

    let access_token = grant
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingField {
            operation: "Refresh",
            field: "access_token",
        })?;
    let expires_at = expiry_from(now, grant.expires_in, "Refresh")?;

    links
        .store_access_token(link.id, &access_token, expires_at)
        .await
        .map_err(|e| {
            tracing::error!(
                link_id = %link.id,
                error = ?e,
                "Failed to store refreshed access token"
            );
            SpotifyError::Database(e)
        })?;

    tracing::info!(
        link_id = %link.id,
        expires_at = %expires_at,
        "Refreshed and stored access token"
    );

    Ok(access_token)
}
