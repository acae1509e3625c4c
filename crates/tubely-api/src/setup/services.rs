//! Wiring of storage, repositories, media tools and the upload pipeline

use crate::auth::{IdentityProvider, JwtIdentityProvider};
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoRepository};
use tubely_processing::{
    FfmpegRemuxer, FfprobeProber, GeometryProber, PipelineConfig, StreamRemuxer,
    VideoUploadPipeline,
};
use tubely_storage::{create_storage, Storage};

/// Build the application state from configuration and an open pool.
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    let scratch_dir = config.scratch_dir();
    tokio::fs::create_dir_all(&scratch_dir)
        .await
        .with_context(|| format!("Failed to create scratch dir {}", scratch_dir.display()))?;

    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));
    let prober: Arc<dyn GeometryProber> = Arc::new(FfprobeProber::new(config.ffprobe_path()));
    let remuxer: Arc<dyn StreamRemuxer> = Arc::new(FfmpegRemuxer::new(config.ffmpeg_path()));
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(JwtIdentityProvider::new(config.jwt_secret()));

    Ok(build_state(
        config.clone(),
        storage,
        videos,
        prober,
        remuxer,
        identity,
    ))
}

/// Assemble state from already-built collaborators.
pub fn build_state(
    config: Config,
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoRepository>,
    prober: Arc<dyn GeometryProber>,
    remuxer: Arc<dyn StreamRemuxer>,
    identity: Arc<dyn IdentityProvider>,
) -> Arc<AppState> {
    let pipeline_config = PipelineConfig::from_config(&config);
    tracing::info!(
        scratch_dir = %pipeline_config.scratch_dir.display(),
        max_upload_bytes = pipeline_config.max_upload_bytes,
        max_concurrent_remuxes = pipeline_config.max_concurrent_remuxes,
        allowed_content_types = %pipeline_config.allowed_content_types.join(","),
        "Upload pipeline configured"
    );

    let pipeline = Arc::new(VideoUploadPipeline::new(
        storage.clone(),
        videos.clone(),
        prober,
        remuxer,
        pipeline_config,
    ));

    Arc::new(AppState {
        config,
        pipeline,
        videos,
        storage,
        identity,
    })
}
