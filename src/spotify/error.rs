use thiserror::Error;

/// Failures acquiring, refreshing or exchanging a Spotify credential.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No refresh token stored")]
    NoRefreshToken,

    #[error("{operation} failed: {status} {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} response missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{operation} response has out-of-range {field}")]
    InvalidField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },
}

/// Non-token Spotify Web API failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} failed: {status} {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },
}

/// Anything that can go wrong on the path from the link record to a
/// Spotify call.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Spotify API error: {0}")]
    Api(#[from] ApiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
