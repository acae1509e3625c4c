//! Mock repository implementations for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tubely_core::models::Video;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use uuid::Uuid;

/// In-memory video metadata store
#[derive(Default)]
pub struct MockVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    fail_updates: AtomicBool,
}

impl MockVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record directly and return it
    pub fn insert(&self, video: Video) -> Video {
        self.videos.lock().unwrap().insert(video.id, video.clone());
        video
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    /// Make every subsequent `update_video` fail
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for MockVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "simulated metadata store failure".to_string(),
            ));
        }
        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;
        *stored = video.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        Ok(self.insert(video.clone()))
    }
}
