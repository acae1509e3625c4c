//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed reader handed to [`Storage::put_stream`].
pub type StorageStream = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The upload pipeline only sees this trait, so tests can swap in an
/// in-memory implementation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket (or bucket-equivalent) every key of this backend lives in.
    fn bucket(&self) -> &str;

    /// Region of the bucket, when the backend has one.
    fn region(&self) -> Option<&str>;

    /// Stream an object to `key`, consuming the reader until EOF.
    ///
    /// `content_type` is stored with the object. Returns the number of bytes written.
    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: StorageStream,
    ) -> StorageResult<u64>;

    /// Generate a presigned/temporary URL for read access (GET)
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Size in bytes of a stored object. `NotFound` when the key has no object.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;
}
