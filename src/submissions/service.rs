use crate::db::models::{NewSubmission, Submission};
use crate::db::{LinkStore, SubmissionStore};
use crate::spotify::client::SpotifyClient;
use crate::spotify::error::SpotifyError;
use crate::spotify::token::get_valid_access_token;

/// Why a submission was not mirrored to the Spotify playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The submitter already suggested this track.
    AlreadySubmitted,
    NoLink,
    /// The link exists but the admin never completed the Spotify handshake.
    NotConnected,
    NoPlaylist,
    NoTrackUri,
}

/// What happened when copying a submission to the Spotify playlist.
///
/// Never affects whether the submission itself succeeded.
#[derive(Debug)]
pub enum MirrorOutcome {
    Added,
    Skipped(SkipReason),
    Failed(SpotifyError),
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub submission: Submission,
    /// `false` when an existing submission was returned.
    pub created: bool,
    pub mirror: MirrorOutcome,
}

/// Store a track suggestion and best-effort copy it to the Spotify playlist.
///
/// Idempotent per (submitter, track id): a repeat returns the stored record,
/// including when a concurrent request wins the insert race.
///
/// # Errors
/// Only local storage failures. Spotify failures end up in
/// `SubmissionReceipt::mirror`.
pub async fn add_submission(
    links: &dyn LinkStore,
    submissions: &dyn SubmissionStore,
    spotify: &SpotifyClient,
    input: NewSubmission,
) -> Result<SubmissionReceipt, sqlx::Error> {
    if let Some(existing) = submissions
        .find_submission(&input.submitter, &input.spotify_track_id)
        .await?
    {
        tracing::debug!(
            submission_id = existing.id,
            submitter = %input.submitter,
            spotify_track_id = %input.spotify_track_id,
            "Submission already exists"
        );
        return Ok(SubmissionReceipt {
            submission: existing,
            created: false,
            mirror: MirrorOutcome::Skipped(SkipReason::AlreadySubmitted),
        });
    }

    let Some(submission) = submissions.insert_submission(&input).await? else {
        tracing::debug!(
            submitter = %input.submitter,
            spotify_track_id = %input.spotify_track_id,
            "Concurrent duplicate submission, returning stored record"
        );
        let existing = submissions
            .find_submission(&input.submitter, &input.spotify_track_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        return Ok(SubmissionReceipt {
            submission: existing,
            created: false,
            mirror: MirrorOutcome::Skipped(SkipReason::AlreadySubmitted),
        });
    };

    tracing::info!(
        submission_id = submission.id,
        submitter = %submission.submitter,
        spotify_track_id = %submission.spotify_track_id,
        "Stored new submission"
    );

    let mirror = mirror_to_playlist(links, spotify, &submission).await;
    match &mirror {
        MirrorOutcome::Added => tracing::info!(
            submission_id = submission.id,
            "Mirrored submission to Spotify playlist"
        ),
        MirrorOutcome::Skipped(reason) => tracing::debug!(
            submission_id = submission.id,
            reason = ?reason,
            "Skipped mirroring submission"
        ),
        MirrorOutcome::Failed(err) => tracing::warn!(
            submission_id = submission.id,
            error = %err,
            "Failed to mirror submission to Spotify playlist"
        ),
    }

    Ok(SubmissionReceipt {
        submission,
        created: true,
        mirror,
    })
}

async fn mirror_to_playlist(
    links: &dyn LinkStore,
    spotify: &SpotifyClient,
    submission: &Submission,
) -> MirrorOutcome {
    let link = match links.get_link().await {
        Ok(Some(link)) => link,
        Ok(None) => return MirrorOutcome::Skipped(SkipReason::NoLink),
        Err(e) => return MirrorOutcome::Failed(SpotifyError::Database(e)),
    };

    if !link.is_connected() {
        return MirrorOutcome::Skipped(SkipReason::NotConnected);
    }
    let Some(playlist_id) = link.spotify_playlist_id.as_deref() else {
        return MirrorOutcome::Skipped(SkipReason::NoPlaylist);
    };
    let Some(track_uri) = submission.spotify_track_uri.as_deref() else {
        return MirrorOutcome::Skipped(SkipReason::NoTrackUri);
    };

    let access_token = match get_valid_access_token(links, spotify, &link).await {
        Ok(token) => token,
        Err(e) => return MirrorOutcome::Failed(e),
    };

    match spotify.add_track(&access_token, playlist_id, track_uri).await {
        Ok(()) => MirrorOutcome::Added,
        Err(e) => MirrorOutcome::Failed(e.into()),
    }
}
