use crate::db::models::{NewSubmission, PlaylistLink, Submission};
use crate::db::{LinkStore, SubmissionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    link: Option<PlaylistLink>,
    submissions: Vec<Submission>,
    next_submission_id: i64,
}

/// In-process store with the same semantics as the PostgreSQL repository.
///
/// Backs the unit, router and integration tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace the link record directly.
    pub fn put_link(&self, link: PlaylistLink) {
        self.write().link = Some(link);
    }

    pub fn submission_count(&self) -> usize {
        self.read().submissions.len()
    }

    // Poisoned locks are recovered.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn update_link<F>(&self, id: Uuid, apply: F) -> Result<PlaylistLink, sqlx::Error>
    where
        F: FnOnce(&mut PlaylistLink),
    {
        let mut inner = self.write();
        match inner.link.as_mut() {
            Some(link) if link.id == id => {
                apply(link);
                Ok(link.clone())
            }
            _ => Err(sqlx::Error::RowNotFound),
        }
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn get_link(&self) -> Result<Option<PlaylistLink>, sqlx::Error> {
        Ok(self.read().link.clone())
    }

    async fn ensure_link(&self) -> Result<PlaylistLink, sqlx::Error> {
        let mut inner = self.write();
        Ok(inner.link.get_or_insert_with(PlaylistLink::new).clone())
    }

    async fn store_linked_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error> {
        self.update_link(id, |link| {
            link.access_token = Some(access_token.to_string());
            link.refresh_token = Some(refresh_token.to_string());
            link.access_token_expires_at = Some(expires_at);
        })
    }

    async fn store_access_token(
        &self,
        id: Uuid,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PlaylistLink, sqlx::Error> {
        self.update_link(id, |link| {
            link.access_token = Some(access_token.to_string());
            link.access_token_expires_at = Some(expires_at);
        })
    }

    async fn set_playlist_id(
        &self,
        id: Uuid,
        playlist_id: &str,
    ) -> Result<PlaylistLink, sqlx::Error> {
        self.update_link(id, |link| {
            link.spotify_playlist_id = Some(playlist_id.to_string());
        })
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn find_submission(
        &self,
        submitter: &str,
        track_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error> {
        Ok(self
            .read()
            .submissions
            .iter()
            .find(|s| s.submitter == submitter && s.spotify_track_id == track_id)
            .cloned())
    }

    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let mut inner = self.write();

        let duplicate = inner.submissions.iter().any(|s| {
            s.submitter == submission.submitter
                && s.spotify_track_id == submission.spotify_track_id
        });
        if duplicate {
            return Ok(None);
        }

        inner.next_submission_id += 1;
        let stored = Submission {
            id: inner.next_submission_id,
            spotify_track_id: submission.spotify_track_id.clone(),
            spotify_track_uri: submission.spotify_track_uri.clone(),
            title: submission.title.clone(),
            artist: submission.artist.clone(),
            album_art_url: submission.album_art_url.clone(),
            submitter: submission.submitter.clone(),
            submitter_avatar_url: submission.submitter_avatar_url.clone(),
            comment: submission.comment.clone(),
            created_at: Utc::now(),
        };
        inner.submissions.push(stored.clone());

        Ok(Some(stored))
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, sqlx::Error> {
        let mut all = self.read().submissions.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }
}
