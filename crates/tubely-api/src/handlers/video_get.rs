use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::models::{Video, VideoResponse};
use tubely_core::AppError;
use uuid::Uuid;

/// Render a record for clients. Stored locations become a presigned URL; if
/// presigning fails the plain bucket URL is used instead.
pub(crate) async fn render_video(state: &AppState, video: Video) -> VideoResponse {
    let video_url = match video.location.as_ref() {
        Some(location) => match state
            .storage
            .presigned_get_url(&location.key, state.presigned_url_expiry())
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    video_id = %video.id,
                    key = %location.key,
                    "Failed to presign video URL, falling back to public URL"
                );
                Some(location.public_url())
            }
        },
        None => None,
    };
    VideoResponse::new(video, video_url)
}

pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("Invalid video ID: {}", raw)))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{video_id}",
    tag = "videos",
    params(("video_id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video record", body = VideoResponse),
        (status = 400, description = "Invalid video ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: Result<AuthUser, HttpAppError>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    // The ID is checked before the caller is authenticated.
    let video_id = parse_video_id(&video_id)?;
    let user = user?;

    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Forbidden("You do not own this video".to_string()).into());
    }

    Ok(Json(render_video(&state, video).await))
}
