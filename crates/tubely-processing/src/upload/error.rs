use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use thiserror::Error;
use tubely_core::error::error_chain;
use tubely_core::AppError;
use tubely_storage::StorageError;
use uuid::Uuid;

use crate::video::{ProbeError, RemuxError};

/// Pipeline steps that run under a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Probe,
    Remux,
    Upload,
}

impl Display for PipelineStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineStep::Probe => write!(f, "probe"),
            PipelineStep::Remux => write!(f, "remux"),
            PipelineStep::Upload => write!(f, "upload"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid upload: {0}")]
    InvalidInput(String),

    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("User {user_id} does not own video {video_id}")]
    Forbidden { video_id: Uuid, user_id: Uuid },

    #[error("Malformed upload body")]
    MalformedBody(#[source] std::io::Error),

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Failed to load video record")]
    Lookup(#[source] AppError),

    #[error("Failed to stage upload")]
    Staging(#[source] std::io::Error),

    #[error("Failed to probe video")]
    Probe(#[from] ProbeError),

    #[error("Failed to remux video")]
    Remux(#[from] RemuxError),

    #[error("Failed to upload video to storage")]
    StorageUpload(#[source] StorageError),

    #[error("Failed to update video record")]
    RecordUpdate(#[source] AppError),

    #[error("{step} timed out after {timeout:?}")]
    Timeout { step: PipelineStep, timeout: Duration },
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let detail = error_chain(&err);
        match err {
            UploadError::UnsupportedContentType(content_type) => AppError::InvalidInput(format!(
                "Unsupported content type '{}'",
                content_type
            )),
            UploadError::InvalidInput(msg) => AppError::InvalidInput(msg),
            UploadError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            UploadError::Forbidden { .. } => {
                AppError::Forbidden("You do not own this video".to_string())
            }
            UploadError::MalformedBody(source) => {
                AppError::InvalidInput(format!("Malformed upload body: {}", source))
            }
            UploadError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "Video exceeds the maximum size of {} bytes",
                limit
            )),
            UploadError::Lookup(source) => source,
            UploadError::Staging(_) => AppError::Internal(detail),
            UploadError::Probe(_) | UploadError::Remux(_) => AppError::MediaProcessing(detail),
            UploadError::StorageUpload(_) => AppError::Storage(detail),
            UploadError::RecordUpdate(_) => AppError::Internal(detail),
            UploadError::Timeout { step, .. } => {
                AppError::Timeout(format!("Video {} step timed out", step))
            }
        }
    }
}
