use crate::admin::AdminSession;
use crate::config::PlaylistMetadata;
use crate::db::LinkStore;
use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::json;

/// Public view of the playlist link, used by the frontend to decide whether
/// submissions can reach Spotify yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub exists: bool,
    pub name: String,
    pub spotify_playlist_id: Option<String>,
    pub description: String,
    pub cover_image_url: String,
}

pub async fn get_link_status(
    links: &dyn LinkStore,
    playlist: &PlaylistMetadata,
) -> Result<LinkStatus, sqlx::Error> {
    let link = links.get_link().await?;

    Ok(LinkStatus {
        exists: link.is_some(),
        name: playlist.title.clone(),
        spotify_playlist_id: link.and_then(|link| link.spotify_playlist_id),
        description: playlist.description.clone(),
        cover_image_url: playlist.cover_image_url.clone(),
    })
}

/// GET /playlist/config
pub async fn playlist_status(State(state): State<AppState>) -> Result<Json<LinkStatus>, AppError> {
    let status = get_link_status(state.links.as_ref(), &state.playlist).await?;
    Ok(Json(status))
}

/// POST /playlist/config
///
/// Creates the link record if it does not exist yet.
pub async fn ensure_playlist_config(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let link = state.links.ensure_link().await?;
    tracing::info!(link_id = %link.id, "Playlist link record ensured");
    Ok(Json(json!({ "ok": true })))
}
