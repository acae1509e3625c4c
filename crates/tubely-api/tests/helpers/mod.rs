//! Test helpers: build the real router over in-memory collaborators.
//!
//! Run with `cargo test -p tubely-api`. No Postgres, S3 or ffmpeg needed.

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtIdentityProvider;
use tubely_api::constants;
use tubely_api::setup::{routes, services};
use tubely_core::{BaseConfig, Config, StorageBackend, VideoServiceConfig};
use tubely_processing::test_helpers::{
    FakeProber, FakeRemuxer, MockStorage, MockVideoRepository,
};

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on every fake behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
    pub videos: Arc<MockVideoRepository>,
    pub prober: Arc<FakeProber>,
    pub remuxer: Arc<FakeRemuxer>,
    pub identity: Arc<JwtIdentityProvider>,
    pub scratch: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn scratch_is_empty(&self) -> bool {
        dir_is_empty(self.scratch.path())
    }
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

pub fn create_test_config(scratch_dir: &Path, max_video_size_bytes: usize) -> Config {
    Config(Box::new(VideoServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
            log_format: "text".to_string(),
        },
        database_url: "postgres://unused/tubely".to_string(),
        storage_backend: Some(StorageBackend::S3),
        s3_bucket: Some(MockStorage::BUCKET.to_string()),
        s3_region: Some(MockStorage::REGION.to_string()),
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: None,
        local_storage_base_url: None,
        presigned_url_expiry_secs: 900,
        max_video_size_bytes,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        scratch_dir: Some(scratch_dir.to_string_lossy().into_owned()),
        probe_timeout_secs: 5,
        remux_timeout_secs: 5,
        storage_upload_timeout_secs: 5,
        max_concurrent_remuxes: 2,
    }))
}

/// Setup a test app whose prober reports `width`x`height`.
pub fn setup_test_app(width: u32, height: u32) -> TestApp {
    setup_test_app_with(FakeProber::new(width, height), FakeRemuxer::new(), 1024 * 1024)
}

pub fn setup_test_app_with(
    prober: FakeProber,
    remuxer: FakeRemuxer,
    max_video_size_bytes: usize,
) -> TestApp {
    let scratch = tempfile::tempdir().expect("Failed to create scratch directory");
    let config = create_test_config(scratch.path(), max_video_size_bytes);

    let storage = Arc::new(MockStorage::new());
    let videos = Arc::new(MockVideoRepository::new());
    let prober = Arc::new(prober);
    let remuxer = Arc::new(remuxer);
    let identity = Arc::new(JwtIdentityProvider::new(config.jwt_secret()));

    let state = services::build_state(
        config.clone(),
        storage.clone(),
        videos.clone(),
        prober.clone(),
        remuxer.clone(),
        identity.clone(),
    );
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        storage,
        videos,
        prober,
        remuxer,
        identity,
        scratch,
    }
}
