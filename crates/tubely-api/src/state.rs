//! Application state shared by every handler.

use crate::auth::IdentityProvider;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::VideoUploadPipeline;
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<VideoUploadPipeline>,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Lifetime of presigned playback URLs in responses.
    pub fn presigned_url_expiry(&self) -> Duration {
        self.config.presigned_url_expiry()
    }
}
