use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::video_get::{parse_video_id, render_video};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;
use tubely_processing::UploadError;

/// A request body cut off by the size limit surfaces as a malformed part; report it as 413.
fn upload_failure(err: UploadError) -> HttpAppError {
    if let UploadError::MalformedBody(ref io_err) = err {
        let limit_hit = io_err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
            .filter(|multipart_err| multipart_err.status() == StatusCode::PAYLOAD_TOO_LARGE);
        if let Some(multipart_err) = limit_hit {
            return AppError::PayloadTooLarge(multipart_err.body_text()).into();
        }
    }
    err.into()
}

#[utoipa::path(
    post,
    path = "/api/v1/video_upload/{video_id}",
    tag = "videos",
    params(("video_id" = String, Path, description = "ID of the video record to attach the upload to")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored and record updated", body = VideoResponse),
        (status = 400, description = "Invalid ID, content type or multipart body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Video too large", body = ErrorResponse),
        (status = 500, description = "Processing, storage or database failure", body = ErrorResponse),
        (status = 504, description = "A processing step timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: Result<AuthUser, HttpAppError>,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    // The ID is checked before the caller is authenticated.
    let video_id = parse_video_id(&video_id)?;
    let user = user?;

    // The first `video` part is the upload; anything before it is skipped.
    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(VIDEO_FORM_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(AppError::InvalidInput(format!(
                    "Missing '{}' form field",
                    VIDEO_FORM_FIELD
                ))
                .into())
            }
        }
    };

    let content_type = field.content_type().unwrap_or_default().to_string();
    let body = StreamReader::new(Box::pin(
        field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
    ));

    let video = state
        .pipeline
        .process_upload(video_id, user.user_id, &content_type, body)
        .await
        .map_err(upload_failure)?;

    tracing::info!(
        video_id = %video.id,
        user_id = %user.user_id,
        key = video.storage_key().unwrap_or_default(),
        "Video upload completed"
    );

    Ok(Json(render_video(&state, video).await))
}
