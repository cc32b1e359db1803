use crate::admin::AdminSession;
use crate::error::AppError;
use crate::spotify::link::{CallbackParams, handle_callback};
use crate::spotify::token::get_valid_access_token;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::json;

fn default_search_limit() -> u32 {
    10
}

/// Query parameters for /spotify/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

/// Build the Spotify authorization URL for the admin
///
/// # Endpoint
/// GET /admin/spotify/authorize
///
/// # Flow
/// 1. Ensure the playlist link record exists
/// 2. Use its ID as the OAuth `state`
/// 3. Return the authorization URL for the frontend to open
///
/// # Returns
/// `{"authorize_url": "https://accounts.spotify.com/authorize?..."}`
pub async fn authorize(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let link = state.links.ensure_link().await?;
    let authorize_url = state.spotify.build_authorize_url(&link.id.to_string());

    tracing::info!(link_id = %link.id, "Starting Spotify OAuth connect flow");

    Ok(Json(json!({ "authorize_url": authorize_url })))
}

/// OAuth callback from Spotify
///
/// # Endpoint
/// GET /admin/spotify/callback?code=<CODE>&state=<STATE>
///
/// # Returns
/// 303 redirect to the admin frontend with `spotify_connected=1` or
/// `spotify_error=<outcome>`
///
/// # Errors
/// Returns 500 only if the link record cannot be read or written
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let outcome = handle_callback(
        state.links.as_ref(),
        &state.spotify,
        &state.playlist,
        params,
    )
    .await?;

    tracing::info!(outcome = outcome.tag(), "Spotify callback handled");

    let target = outcome.redirect_url(&state.frontend_admin_url);
    Ok(Redirect::to(target.as_str()))
}

/// Search Spotify tracks on behalf of a member
///
/// # Endpoint
/// GET /spotify/search?q=<QUERY>&limit=<N>
///
/// # Errors
/// - 400 if no Spotify account is linked yet
/// - 502 if Spotify rejects the token refresh or the search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let link = state
        .links
        .get_link()
        .await?
        .filter(|link| link.is_connected())
        .ok_or(AppError::NotReady)?;

    let access_token = get_valid_access_token(state.links.as_ref(), &state.spotify, &link).await?;

    let results = state
        .spotify
        .search_tracks(&access_token, &query.q, query.limit)
        .await
        .map_err(|e| AppError::Upstream(e.into()))?;

    Ok(Json(results))
}
