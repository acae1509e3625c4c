//! Types for the upload pipeline.

use std::path::PathBuf;
use std::time::Duration;

use tubely_core::Config;

/// Limits and locations the pipeline runs with, fixed at construction.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: u64,
    /// Normalized (lowercase, no parameters) media types
    pub allowed_content_types: Vec<String>,
    pub probe_timeout: Duration,
    pub remux_timeout: Duration,
    pub upload_timeout: Duration,
    pub max_concurrent_remuxes: usize,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: config.scratch_dir(),
            max_upload_bytes: config.max_video_size_bytes() as u64,
            allowed_content_types: config.video_allowed_content_types().to_vec(),
            probe_timeout: config.probe_timeout(),
            remux_timeout: config.remux_timeout(),
            upload_timeout: config.storage_upload_timeout(),
            max_concurrent_remuxes: config.max_concurrent_remuxes(),
        }
    }
}
