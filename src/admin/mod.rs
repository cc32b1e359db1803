pub mod routes;
pub mod session;

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use session::{SESSION_COOKIE, SessionClaims, cookie_value, verify_session_token};

/// Extractor that only succeeds for requests carrying a valid admin session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookies| cookie_value(cookies, SESSION_COOKIE))
            .ok_or(AppError::Unauthorized("Not authenticated as admin."))?;

        let claims = verify_session_token(&state.config.admin_jwt_secret, token)?;
        Ok(AdminSession(claims))
    }
}
