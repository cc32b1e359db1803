use crate::db::models::{NewSubmission, PlaylistLink, Submission};
use crate::db::{LinkStore, SubmissionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const LINK_COLUMNS: &str = r#"
    id,
    refresh_token,
    access_token,
    access_token_expires_at,
    spotify_playlist_id,
    created_at
"#;

const SUBMISSION_COLUMNS: &str = r#"
    id,
    spotify_track_id,
    spotify_track_uri,
    title,
    artist,
    album_art_url,
    submitter,
    submitter_avatar_url,
    comment,
    created_at
"#;

/// PostgreSQL-backed store for the playlist link and submissions.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PgRepository {
    /// Get the singleton link record, if an admin has created it.
    async fn get_link(&self) -> Result<Option<PlaylistLink>, sqlx::Error> {
        sqlx::query_as::<_, PlaylistLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM playlist_link WHERE singleton"
        ))
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert the singleton row if missing, then return it.
    ///
    /// The `singleton` unique column makes concurrent first calls converge on
    /// the same row.
    async fn ensure_link(&self) -> Result<PlaylistLink, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO playlist_link (id)
            VALUES ($1)
            ON CONFLICT (singleton) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, PlaylistLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM playlist_link WHERE singleton"
        ))
        .fetch_one(&self.pool)
        .await
    }

    /// Store access and refresh tokens from a code exchange.
    ///
    /// # Errors
    /// Returns `RowNotFound` if no record has the given ID.
    async fn store_linked_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error> {
        sqlx::query_as::<_, PlaylistLink>(&format!(
            r#"
            UPDATE playlist_link
            SET
                access_token = $1,
                refresh_token = $2,
                access_token_expires_at = $3
            WHERE id = $4
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn store_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error> {
        sqlx::query_as::<_, PlaylistLink>(&format!(
            r#"
            UPDATE playlist_link
            SET
                access_token = $1,
                access_token_expires_at = $2
            WHERE id = $3
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(access_token)
        .bind(expires_at)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_playlist_id(
        &self,
        id: Uuid,
        playlist_id: &str,
    ) -> Result<PlaylistLink, sqlx::Error> {
        sqlx::query_as::<_, PlaylistLink>(&format!(
            r#"
            UPDATE playlist_link
            SET spotify_playlist_id = $1
            WHERE id = $2
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(playlist_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl SubmissionStore for PgRepository {
    async fn find_submission(
        &self,
        submitter: &str,
        track_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE submitter = $1 AND spotify_track_id = $2
            "#
        ))
        .bind(submitter)
        .bind(track_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert a submission, relying on the (submitter, track) unique
    /// constraint for deduplication.
    ///
    /// # Returns
    /// `None` if a concurrent writer already stored the same pair
    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO submissions (
                spotify_track_id,
                spotify_track_uri,
                title,
                artist,
                album_art_url,
                submitter,
                submitter_avatar_url,
                comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (submitter, spotify_track_id) DO NOTHING
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(&submission.spotify_track_id)
        .bind(&submission.spotify_track_uri)
        .bind(&submission.title)
        .bind(&submission.artist)
        .bind(&submission.album_art_url)
        .bind(&submission.submitter)
        .bind(&submission.submitter_avatar_url)
        .bind(&submission.comment)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }
}
