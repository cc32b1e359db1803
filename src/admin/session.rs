use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "admin_session";
pub const SESSION_TTL_MINUTES: i64 = 60;
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue an HS256 JWT for an admin session starting at `now`.
pub fn issue_session_token(
    secret: &str,
    subject: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: subject.to_string(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(SESSION_TTL_MINUTES)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session: {}", e)))
}

/// Verify an admin session JWT
///
/// Signature and `exp` are checked by `jsonwebtoken` against the system
/// clock, with no leeway.
///
/// # Errors
/// - `Unauthorized` if the token is malformed, forged or expired
/// - `Forbidden` if the claims do not carry the admin role
pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected admin session token");
        AppError::Unauthorized("Invalid admin session.")
    })?
    .claims;

    if claims.role != ADMIN_ROLE {
        return Err(AppError::Forbidden);
    }

    Ok(claims)
}

/// Read a cookie value from a `Cookie` header.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value carrying a fresh session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_MINUTES * 60
    )
}

/// `Set-Cookie` value that removes the session.
pub fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    fn sign(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let token = issue_session_token(SECRET, "admin", Utc::now()).unwrap();

        let claims = verify_session_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_is_standard_hs256_jwt() {
        let token = issue_session_token(SECRET, "admin", Utc::now()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_accepts_jwt_signed_with_default_header() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "admin".to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify_session_token(SECRET, &token).unwrap(), claims);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_session_token(SECRET, "admin", Utc::now()).unwrap();

        let result = verify_session_token("other_secret", &token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = issue_session_token(SECRET, "admin", now).unwrap();
        let signature = token.rsplit('.').next().unwrap();

        let forged_claims = SessionClaims {
            sub: "mallory".to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 999_999,
        };
        let forged = sign(&forged_claims, "attacker_secret");
        let (forged_unsigned, _) = forged.rsplit_once('.').unwrap();
        let forged = format!("{}.{}", forged_unsigned, signature);

        let result = verify_session_token(SECRET, &forged);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_session_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = issue_session_token(SECRET, "admin", issued).unwrap();

        let result = verify_session_token(SECRET, &token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_non_admin_role_forbidden() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "guest".to_string(),
            role: "viewer".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 60,
        };
        let token = sign(&claims, SECRET);

        let result = verify_session_token(SECRET, &token);
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        for token in ["", "no-dot", "abc.not-hex", "a.b.c"] {
            let result = verify_session_token(SECRET, token);
            assert!(
                matches!(result, Err(AppError::Unauthorized(_))),
                "Expected rejection for {:?}",
                token
            );
        }
    }

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; admin_session=abc.def.ghi; other=1";
        assert_eq!(cookie_value(header, "admin_session"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("admin_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cleared_session_cookie().contains("Max-Age=0"));
    }
}
