//! Video upload orchestration.
//!
//! One call to [`VideoUploadPipeline::process_upload`] handles one request:
//! check content type and ownership, stage the body to a scratch file, probe,
//! classify, remux for fast start, stream the result to object storage and point
//! the owning record at it. No step is retried. Scratch files are removed on
//! every exit path, including cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use tubely_core::models::{Video, VideoLocation};
use tubely_db::VideoRepository;
use tubely_storage::{
    build_object_key, extension_for_content_type, generate_object_name, Storage, StorageError,
};

use super::content_type::normalize_content_type;
use super::error::{PipelineStep, UploadError};
use super::types::PipelineConfig;
use crate::scratch::ScratchFile;
use crate::video::{classify, processing_path, GeometryProber, RemuxError, StreamRemuxer};

pub struct VideoUploadPipeline {
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoRepository>,
    prober: Arc<dyn GeometryProber>,
    remuxer: Arc<dyn StreamRemuxer>,
    remux_permits: Arc<Semaphore>,
    config: PipelineConfig,
}

/// Accepted upload, after content type and ownership checks
struct Accepted {
    video: Video,
    content_type: String,
    extension: String,
}

async fn with_deadline<T, E, F>(step: PipelineStep, timeout: Duration, fut: F) -> Result<T, UploadError>
where
    F: Future<Output = Result<T, E>>,
    UploadError: From<E>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(UploadError::from),
        Err(_) => Err(UploadError::Timeout { step, timeout }),
    }
}

/// Scratch files in the order they are released: most recently acquired first.
fn release_order<'a>(
    staged: &'a mut ScratchFile,
    processed: &'a mut ScratchFile,
) -> [&'a mut ScratchFile; 2] {
    [processed, staged]
}

impl VideoUploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        prober: Arc<dyn GeometryProber>,
        remuxer: Arc<dyn StreamRemuxer>,
        config: PipelineConfig,
    ) -> Self {
        let permits = config.max_concurrent_remuxes.max(1);
        Self {
            storage,
            videos,
            prober,
            remuxer,
            remux_permits: Arc::new(Semaphore::new(permits)),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ownership, then content type. Touches no files.
    async fn accept(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        raw_content_type: &str,
    ) -> Result<Accepted, UploadError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadError::Lookup)?
            .ok_or(UploadError::NotFound(video_id))?;

        if !video.is_owned_by(user_id) {
            return Err(UploadError::Forbidden { video_id, user_id });
        }

        let content_type = normalize_content_type(raw_content_type);
        if !self.config.allowed_content_types.contains(&content_type) {
            return Err(UploadError::UnsupportedContentType(content_type));
        }
        let extension = extension_for_content_type(&content_type)
            .ok_or_else(|| UploadError::UnsupportedContentType(content_type.clone()))?
            .to_string();

        Ok(Accepted {
            video,
            content_type,
            extension,
        })
    }

    /// Run the full pipeline for one upload and return the updated record.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %user_id))]
    pub async fn process_upload<R>(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        raw_content_type: &str,
        body: R,
    ) -> Result<Video, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let accepted = self.accept(video_id, user_id, raw_content_type).await?;

        let name = generate_object_name();
        let mut staged = ScratchFile::create_in(&self.config.scratch_dir)
            .await
            .map_err(UploadError::Staging)?;
        let output_base = self.config.scratch_dir.join(&name);
        let mut processed = ScratchFile::adopt(processing_path(&output_base));

        let result = self
            .run(accepted, &name, body, &mut staged, &mut processed)
            .await;

        for scratch in release_order(&mut staged, &mut processed) {
            if let Err(e) = scratch.cleanup().await {
                tracing::warn!(
                    error = %e,
                    path = %scratch.path().display(),
                    "Failed to remove scratch file"
                );
            }
        }

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "Video upload failed");
        }
        result
    }

    async fn run<R>(
        &self,
        accepted: Accepted,
        name: &str,
        body: R,
        staged: &mut ScratchFile,
        processed: &mut ScratchFile,
    ) -> Result<Video, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let Accepted {
            mut video,
            content_type,
            extension,
        } = accepted;

        let staged_bytes = self.stage(body, staged).await?;
        tracing::debug!(size_bytes = staged_bytes, path = %staged.path().display(), "Upload staged");

        let geometry = with_deadline(
            PipelineStep::Probe,
            self.config.probe_timeout,
            self.prober.probe(staged.path()),
        )
        .await?;
        let class = classify(geometry.width, geometry.height);
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            aspect = %class,
            "Video classified"
        );

        let output_base = self.config.scratch_dir.join(name);
        {
            let _permit = self
                .remux_permits
                .acquire()
                .await
                .map_err(|e| RemuxError::Spawn(std::io::Error::other(e)))?;
            let remuxed = with_deadline(
                PipelineStep::Remux,
                self.config.remux_timeout,
                self.remuxer.remux_faststart(staged.path(), &output_base),
            )
            .await
            .inspect_err(|e| {
                if let UploadError::Remux(RemuxError::Failed {
                    status,
                    stdout,
                    stderr,
                }) = e
                {
                    tracing::error!(status = %status, stdout = %stdout, stderr = %stderr, "ffmpeg remux failed");
                }
            })?;
            if remuxed != processed.path() {
                *processed = ScratchFile::adopt(remuxed);
            }
        }

        let key = build_object_key(class, name, &extension);
        self.store(&key, &content_type, processed).await?;

        let location = VideoLocation::new(
            self.storage.bucket(),
            key.clone(),
            self.storage.region().map(String::from),
        );
        video.location = Some(location);

        match self.videos.update_video(&video).await {
            Ok(updated) => {
                tracing::info!(
                    bucket = %self.storage.bucket(),
                    key = %key,
                    "Video upload completed"
                );
                Ok(updated)
            }
            Err(e) => {
                tracing::error!(
                    orphaned_object = true,
                    bucket = %self.storage.bucket(),
                    key = %key,
                    error = %e.detailed_message(),
                    "Video record update failed after upload; object is orphaned"
                );
                Err(UploadError::RecordUpdate(e))
            }
        }
    }

    /// Copy the body into the staged file, enforcing the size limit, then rewind.
    async fn stage<R>(&self, body: R, staged: &mut ScratchFile) -> Result<u64, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let limit = self.config.max_upload_bytes;
        let file = staged.file_mut().await.map_err(UploadError::Staging)?;

        // One byte past the limit is enough to tell an oversize body apart.
        let mut limited = body.take(limit.saturating_add(1));
        // Body readers report a broken request stream as InvalidData.
        let written = tokio::io::copy(&mut limited, &mut *file)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::InvalidData => UploadError::MalformedBody(e),
                _ => UploadError::Staging(e),
            })?;
        if written > limit {
            return Err(UploadError::TooLarge { limit });
        }
        if written == 0 {
            return Err(UploadError::InvalidInput("Uploaded video is empty".to_string()));
        }

        file.flush().await.map_err(UploadError::Staging)?;
        file.sync_all().await.map_err(UploadError::Staging)?;
        file.rewind().await.map_err(UploadError::Staging)?;
        Ok(written)
    }

    /// Stream the processed file to storage, then read back the stored size.
    /// The record is only pointed at objects whose size matches the local file.
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        processed: &mut ScratchFile,
    ) -> Result<(), UploadError> {
        let file = processed.take_file().await.map_err(UploadError::Staging)?;
        let size = file
            .metadata()
            .await
            .map_err(UploadError::Staging)?
            .len();

        let upload = async {
            self.storage
                .put_stream(key, content_type, Some(size), Box::pin(file))
                .await
                .map_err(UploadError::StorageUpload)?;
            self.storage
                .content_length(key)
                .await
                .map_err(UploadError::StorageUpload)
        };
        let stored =
            with_deadline(PipelineStep::Upload, self.config.upload_timeout, upload).await?;
        if stored != size {
            return Err(UploadError::StorageUpload(StorageError::UploadFailed(format!(
                "stored object {} has {} bytes, expected {}",
                key, stored, size
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeProber, FakeRemuxer, MockStorage, MockVideoRepository};
    use crate::video::VideoGeometry;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    struct Harness {
        pipeline: VideoUploadPipeline,
        storage: Arc<MockStorage>,
        videos: Arc<MockVideoRepository>,
        prober: Arc<FakeProber>,
        remuxer: Arc<FakeRemuxer>,
        scratch: TempDir,
    }

    fn harness(prober: FakeProber, remuxer: FakeRemuxer, max_upload_bytes: u64) -> Harness {
        harness_with(prober, remuxer, MockStorage::new(), |config| {
            config.max_upload_bytes = max_upload_bytes;
        })
    }

    fn harness_with(
        prober: FakeProber,
        remuxer: FakeRemuxer,
        storage: MockStorage,
        tweak: impl FnOnce(&mut PipelineConfig),
    ) -> Harness {
        let scratch = tempdir().unwrap();
        let storage = Arc::new(storage);
        let videos = Arc::new(MockVideoRepository::new());
        let prober = Arc::new(prober);
        let remuxer = Arc::new(remuxer);
        let mut config = PipelineConfig {
            scratch_dir: scratch.path().to_path_buf(),
            max_upload_bytes: 1024,
            allowed_content_types: vec!["video/mp4".to_string()],
            probe_timeout: Duration::from_secs(5),
            remux_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(5),
            max_concurrent_remuxes: 2,
        };
        tweak(&mut config);
        let pipeline = VideoUploadPipeline::new(
            storage.clone(),
            videos.clone(),
            prober.clone(),
            remuxer.clone(),
            config,
        );
        Harness {
            pipeline,
            storage,
            videos,
            prober,
            remuxer,
            scratch,
        }
    }

    fn scratch_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    fn body() -> &'static [u8] {
        b"\x00\x00\x00\x18ftypmp42 fake video payload"
    }

    #[tokio::test]
    async fn test_landscape_upload_updates_record() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Boots", ""));

        let updated = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap();

        let location = updated.location.expect("location set");
        assert!(location.key.starts_with("landscape/"));
        assert!(location.key.ends_with(".mp4"));
        assert_eq!(location.bucket, h.storage.bucket());

        let object = h.storage.get_file(&location.key).unwrap();
        assert!(!object.is_empty());
        assert!(object.starts_with(FakeRemuxer::FASTSTART_MARKER));
        assert_eq!(
            h.storage.content_type_of(&location.key).as_deref(),
            Some("video/mp4")
        );
        assert_eq!(h.videos.get(video.id).unwrap().location, Some(location));
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_portrait_prefix() {
        let h = harness(FakeProber::new(1080, 1920), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Tall", ""));

        let updated = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4; codecs=avc1", body())
            .await
            .unwrap();

        assert!(updated.storage_key().unwrap().starts_with("portrait/"));
    }

    #[tokio::test]
    async fn test_other_prefix_for_square_video() {
        let h = harness(FakeProber::new(1080, 1080), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Square", ""));

        let updated = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap();

        assert!(updated.storage_key().unwrap().starts_with("other/"));
    }

    #[tokio::test]
    async fn test_unsupported_content_type_rejected_before_io() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Gif", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "image/gif", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::UnsupportedContentType(_)));
        assert_eq!(h.prober.calls(), 0);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_non_owner_forbidden_before_io() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let video = h.videos.insert(Video::new(Uuid::new_v4(), "Mine", ""));

        let err = h
            .pipeline
            .process_upload(video.id, Uuid::new_v4(), "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Forbidden { .. }));
        assert_eq!(h.prober.calls(), 0);
        assert!(scratch_is_empty(h.scratch.path()));
        assert!(h.videos.get(video.id).unwrap().location.is_none());
    }

    #[tokio::test]
    async fn test_missing_record() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let err = h
            .pipeline
            .process_upload(Uuid::new_v4(), Uuid::new_v4(), "video/mp4", body())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remux_failure_cleans_up_and_leaves_record() {
        let h = harness(
            FakeProber::new(1920, 1080),
            FakeRemuxer::failing("moov atom not found"),
            1024,
        );
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Broken", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Remux(_)));
        // The failing remuxer leaves a partial output behind; both files must be gone.
        assert_eq!(h.remuxer.calls(), 1);
        assert!(scratch_is_empty(h.scratch.path()));
        assert!(h.storage.is_empty());
        assert!(h.videos.get(video.id).unwrap().location.is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_cleans_up() {
        let h = harness(FakeProber::failing(), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "NoStreams", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Probe(_)));
        assert_eq!(h.remuxer.calls(), 0);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_oversize_body_rejected() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 8);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Big", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::TooLarge { limit: 8 }));
        assert_eq!(h.prober.calls(), 0);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    struct BrokenBody;

    impl AsyncRead for BrokenBody {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "stream ended mid-part",
            )))
        }
    }

    #[tokio::test]
    async fn test_broken_body_is_malformed_not_staging() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Cut", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body().chain(BrokenBody))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::MalformedBody(_)));
        assert_eq!(h.prober.calls(), 0);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_record_untouched() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        h.storage.fail_uploads(true);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Offline", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::StorageUpload(_)));
        assert!(h.videos.get(video.id).unwrap().location.is_none());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_record_update_failure_keeps_uploaded_object() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        h.videos.fail_updates(true);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Orphan", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::RecordUpdate(_)));
        // No compensating delete is issued.
        assert_eq!(h.storage.len(), 1);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let mut h = harness(
            FakeProber::new(1920, 1080).with_delay(Duration::from_millis(200)),
            FakeRemuxer::new(),
            1024,
        );
        h.pipeline.config.probe_timeout = Duration::from_millis(20);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Slow", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Timeout {
                step: PipelineStep::Probe,
                ..
            }
        ));
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_non_owner_with_unsupported_type_is_forbidden() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let video = h.videos.insert(Video::new(Uuid::new_v4(), "Mine", ""));

        let err = h
            .pipeline
            .process_upload(video.id, Uuid::new_v4(), "image/gif", body())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_remux_timeout() {
        let h = harness_with(
            FakeProber::new(1920, 1080),
            FakeRemuxer::new().with_delay(Duration::from_secs(5)),
            MockStorage::new(),
            |config| config.remux_timeout = Duration::from_millis(100),
        );
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Slow", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Timeout {
                step: PipelineStep::Remux,
                ..
            }
        ));
        assert!(h.storage.is_empty());
        assert!(h.videos.get(video.id).unwrap().location.is_none());
        // The partial remux output is gone along with the staged upload.
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_upload_timeout() {
        let h = harness_with(
            FakeProber::new(1920, 1080),
            FakeRemuxer::new(),
            MockStorage::new().with_put_delay(Duration::from_secs(5)),
            |config| config.upload_timeout = Duration::from_millis(100),
        );
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Stalled", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Timeout {
                step: PipelineStep::Upload,
                ..
            }
        ));
        assert!(h.storage.is_empty());
        assert!(h.videos.get(video.id).unwrap().location.is_none());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_cancelled_mid_remux_removes_scratch_files() {
        let h = harness(
            FakeProber::new(1920, 1080),
            FakeRemuxer::new().with_delay(Duration::from_secs(5)),
            1024,
        );
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Abandoned", ""));

        // Dropping the request future is what a client disconnect looks like.
        let outcome = tokio::time::timeout(
            Duration::from_millis(500),
            h.pipeline
                .process_upload(video.id, owner, "video/mp4", body()),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(h.remuxer.calls(), 1);
        assert!(scratch_is_empty(h.scratch.path()));
        assert!(h.storage.is_empty());
        assert!(h.videos.get(video.id).unwrap().location.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_remuxes_bounded_by_permits() {
        let h = harness_with(
            FakeProber::new(1920, 1080),
            FakeRemuxer::new().with_delay(Duration::from_millis(50)),
            MockStorage::new(),
            |config| config.max_concurrent_remuxes = 1,
        );
        let owner = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..4)
            .map(|i| h.videos.insert(Video::new(owner, format!("Clip {i}"), "")).id)
            .collect();

        let pipeline = &h.pipeline;
        let upload = move |id: Uuid| pipeline.process_upload(id, owner, "video/mp4", body());
        let (a, b, c, d) = tokio::join!(
            upload(ids[0]),
            upload(ids[1]),
            upload(ids[2]),
            upload(ids[3])
        );

        for result in [a, b, c, d] {
            assert!(result.is_ok());
        }
        assert_eq!(h.remuxer.calls(), 4);
        assert_eq!(h.remuxer.peak_in_flight(), 1);
        assert_eq!(h.storage.len(), 4);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_processed_file_released_before_staged() {
        let dir = tempdir().unwrap();
        let mut staged = ScratchFile::create_in(dir.path()).await.unwrap();
        let mut processed = ScratchFile::adopt(processing_path(&dir.path().join("out")));
        let staged_path = staged.path().to_path_buf();
        let processed_path = processed.path().to_path_buf();

        let order: Vec<_> = release_order(&mut staged, &mut processed)
            .into_iter()
            .map(|scratch| scratch.path().to_path_buf())
            .collect();

        assert_eq!(order, vec![processed_path, staged_path]);
    }

    #[tokio::test]
    async fn test_short_stored_object_leaves_record_untouched() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        h.storage.truncate_uploads(true);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Truncated", ""));

        let err = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::StorageUpload(StorageError::UploadFailed(_))
        ));
        assert!(h.videos.get(video.id).unwrap().location.is_none());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn test_geometry_is_recomputed_each_run() {
        let h = harness(FakeProber::new(1920, 1080), FakeRemuxer::new(), 1024);
        let owner = Uuid::new_v4();
        let video = h.videos.insert(Video::new(owner, "Twice", ""));

        h.pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap();
        h.prober.set_geometry(VideoGeometry {
            width: 720,
            height: 1280,
        });
        let second = h
            .pipeline
            .process_upload(video.id, owner, "video/mp4", body())
            .await
            .unwrap();

        assert_eq!(h.prober.calls(), 2);
        assert!(second.storage_key().unwrap().starts_with("portrait/"));
    }
}
