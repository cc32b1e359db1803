use crate::spotify::error::SpotifyError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application-specific errors with HTTP status code mappings
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not authenticated: {0}")]
    Unauthorized(&'static str),

    #[error("Not authorized")]
    Forbidden,

    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error("Playlist or Spotify connection is not fully configured")]
    NotReady,

    #[error("Spotify unavailable: {0}")]
    Upstream(#[from] SpotifyError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Unauthorized(reason) => {
                tracing::warn!("Admin authentication failed: {}", reason);
                (StatusCode::UNAUTHORIZED, *reason)
            }
            AppError::Forbidden => {
                tracing::warn!("Admin session lacks admin role");
                (StatusCode::FORBIDDEN, "Not authorized.")
            }
            AppError::InvalidCredentials => {
                tracing::warn!("Invalid admin login attempt");
                (StatusCode::UNAUTHORIZED, "Invalid admin credentials.")
            }
            AppError::NotReady => {
                tracing::warn!("Spotify operation attempted before playlist link is ready");
                (
                    StatusCode::BAD_REQUEST,
                    "Playlist or Spotify connection is not fully configured.",
                )
            }
            AppError::Upstream(SpotifyError::Database(err)) => {
                tracing::error!("Database error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Upstream(err) => {
                tracing::error!("Spotify error: {}", err);
                (StatusCode::BAD_GATEWAY, "Spotify is currently unavailable.")
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.as_str())
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
