pub mod memory;
pub mod models;
pub mod repository;

use crate::db::models::{NewSubmission, PlaylistLink, Submission};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use repository::PgRepository;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    tracing::info!("Initializing database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool initialized successfully");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Storage for the singleton playlist link record.
///
/// Every mutating call updates the row in place and returns the reloaded
/// record.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn get_link(&self) -> Result<Option<PlaylistLink>, sqlx::Error>;

    /// Return the link record, creating an empty one on first use.
    async fn ensure_link(&self) -> Result<PlaylistLink, sqlx::Error>;

    /// Store the token pair obtained from an authorization-code exchange.
    async fn store_linked_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error>;

    /// Cache a freshly refreshed access token.
    async fn store_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error>;

    async fn set_playlist_id(
        &self,
        id: Uuid,
        playlist_id: &str,
    ) -> Result<PlaylistLink, sqlx::Error>;
}

/// Storage for submissions, unique per (submitter, track id).
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_submission(
        &self,
        submitter: &str,
        track_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error>;

    /// Insert a submission. Returns `None` when the (submitter, track id)
    /// pair already exists.
    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<Submission>, sqlx::Error>;

    /// All submissions, newest first.
    async fn list_submissions(&self) -> Result<Vec<Submission>, sqlx::Error>;
}
