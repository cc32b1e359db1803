use crate::db::models::{NewSubmission, Submission};
use crate::error::AppError;
use crate::spotify::parser::{normalize_track_id, track_uri};
use crate::state::AppState;
use crate::submissions::service::add_submission;
use axum::{Json, extract::State};

/// List all submissions
///
/// # Endpoint
/// GET /songs
///
/// # Returns
/// Submissions ordered newest first
pub async fn list_songs(State(state): State<AppState>) -> Result<Json<Vec<Submission>>, AppError> {
    let submissions = state.submissions.list_submissions().await?;
    Ok(Json(submissions))
}

/// Submit a track suggestion
///
/// # Endpoint
/// POST /songs
///
/// # Flow
/// 1. Validate and normalise the input
/// 2. Store the submission (or return the existing one for this submitter)
/// 3. Best-effort add the track to the linked Spotify playlist
///
/// # Returns
/// The stored submission. Spotify failures never fail this request.
///
/// # Errors
/// - 400 Bad Request for empty or malformed fields
/// - 500 if the submission cannot be stored
pub async fn create_song(
    State(state): State<AppState>,
    Json(input): Json<NewSubmission>,
) -> Result<Json<Submission>, AppError> {
    let input = validate_submission(input)?;

    let receipt = add_submission(
        state.links.as_ref(),
        state.submissions.as_ref(),
        &state.spotify,
        input,
    )
    .await?;

    Ok(Json(receipt.submission))
}

fn required(field: &str, value: String) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim fields, reject empty required ones and normalise the track ID.
///
/// A track given as a share link or `spotify:track:` URI is reduced to its
/// ID and a missing URI is filled in from it. Other IDs are kept as sent.
pub fn validate_submission(input: NewSubmission) -> Result<NewSubmission, AppError> {
    let raw_track_id = required("spotify_track_id", input.spotify_track_id)?;
    let spotify_track_id = normalize_track_id(&raw_track_id);

    let spotify_track_uri = optional(input.spotify_track_uri)
        .or_else(|| (spotify_track_id != raw_track_id).then(|| track_uri(&spotify_track_id)));

    Ok(NewSubmission {
        spotify_track_id,
        spotify_track_uri,
        title: required("title", input.title)?,
        artist: required("artist", input.artist)?,
        album_art_url: optional(input.album_art_url),
        submitter: required("submitter", input.submitter)?,
        submitter_avatar_url: optional(input.submitter_avatar_url),
        comment: optional(input.comment),
    })
}
