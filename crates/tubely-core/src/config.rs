//! Configuration module
//!
//! This module provides configuration structures for the API and the upload
//! pipeline, including database, storage, authentication and media tool settings.
//! Configuration is loaded once at startup and passed explicitly to every
//! component that needs it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    /// "text" (default) or "json"
    pub log_format: String,
}

/// Video service configuration
#[derive(Clone, Debug)]
pub struct VideoServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub presigned_url_expiry_secs: u64,
    // Upload pipeline configuration
    pub max_video_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub scratch_dir: Option<String>,
    pub probe_timeout_secs: u64,
    pub remux_timeout_secs: u64,
    pub storage_upload_timeout_secs: u64,
    pub max_concurrent_remuxes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<VideoServiceConfig>);

impl Config {
    fn as_video(&self) -> &VideoServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_video().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = VideoServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_video().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_video().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_video().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_video().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_video().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_video().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.as_video().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_video().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.as_video().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_video().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_video().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_video().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_video().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_video().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_video().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_video().local_storage_base_url.as_deref()
    }

    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.as_video().presigned_url_expiry_secs)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_video().max_video_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_video().video_allowed_content_types
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_video().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_video().ffprobe_path
    }

    /// Directory for scratch files; falls back to the OS temp dir.
    pub fn scratch_dir(&self) -> PathBuf {
        self.as_video()
            .scratch_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.as_video().probe_timeout_secs)
    }

    pub fn remux_timeout(&self) -> Duration {
        Duration::from_secs(self.as_video().remux_timeout_secs)
    }

    pub fn storage_upload_timeout(&self) -> Duration {
        Duration::from_secs(self.as_video().storage_upload_timeout_secs)
    }

    pub fn max_concurrent_remuxes(&self) -> usize {
        self.as_video().max_concurrent_remuxes
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_parse<T: std::str::FromStr + ToString + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

fn megabytes_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large: {}", mb))
}

impl VideoServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_VIDEO_SIZE_MB: usize = 10 * 1024;
        const PROBE_TIMEOUT_SECS: u64 = 60;
        const REMUX_TIMEOUT_SECS: u64 = 900;
        const STORAGE_UPLOAD_TIMEOUT_SECS: u64 = 1800;
        const MAX_CONCURRENT_REMUXES: usize = 2;
        const PRESIGNED_URL_EXPIRY_SECS: u64 = 900;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let config = VideoServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            presigned_url_expiry_secs: env_parse(
                "PRESIGNED_URL_EXPIRY_SECS",
                PRESIGNED_URL_EXPIRY_SECS,
            ),
            max_video_size_bytes: megabytes_to_bytes(env_parse(
                "MAX_VIDEO_SIZE_MB",
                MAX_VIDEO_SIZE_MB,
            ))?,
            video_allowed_content_types: env_list("VIDEO_ALLOWED_CONTENT_TYPES", "video/mp4"),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            scratch_dir: env::var("SCRATCH_DIR").ok().filter(|s| !s.is_empty()),
            probe_timeout_secs: env_parse("PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS),
            remux_timeout_secs: env_parse("REMUX_TIMEOUT_SECS", REMUX_TIMEOUT_SECS),
            storage_upload_timeout_secs: env_parse(
                "STORAGE_UPLOAD_TIMEOUT_SECS",
                STORAGE_UPLOAD_TIMEOUT_SECS,
            ),
            max_concurrent_remuxes: env_parse("MAX_CONCURRENT_REMUXES", MAX_CONCURRENT_REMUXES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.video_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.max_concurrent_remuxes == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_REMUXES must be at least 1"));
        }

        if self.probe_timeout_secs == 0
            || self.remux_timeout_secs == 0
            || self.storage_upload_timeout_secs == 0
        {
            return Err(anyhow::anyhow!("Pipeline timeouts must be greater than zero"));
        }

        match self.storage_backend.unwrap_or(StorageBackend::S3) {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
