use crate::admin::AdminSession;
use crate::admin::session::{cleared_session_cookie, issue_session_token, session_cookie};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Start an admin session
///
/// # Endpoint
/// POST /admin/login
///
/// # Returns
/// `{"ok": true}` and an `admin_session` cookie
///
/// # Errors
/// Returns 401 Unauthorized if the credentials do not match the configured ones
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = &state.config;
    if credentials.username != config.admin_username
        || credentials.password != config.admin_password
    {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_session_token(&config.admin_jwt_secret, &credentials.username, Utc::now())?;
    tracing::info!(admin = %credentials.username, "Admin logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(json!({ "ok": true })),
    ))
}

/// End the admin session
///
/// # Endpoint
/// POST /admin/logout
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, cleared_session_cookie())]),
        Json(json!({ "ok": true })),
    )
}

/// Check the admin session cookie
///
/// # Endpoint
/// GET /admin/me
pub async fn me(AdminSession(claims): AdminSession) -> Json<serde_json::Value> {
    tracing::debug!(admin = %claims.sub, "Admin session verified");
    Json(json!({ "ok": true }))
}
