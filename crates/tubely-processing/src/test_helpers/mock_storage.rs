//! Mock Storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tubely_storage::{Storage, StorageError, StorageResult, StorageStream};

#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Mock storage implementation that keeps objects in memory
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_uploads: AtomicBool,
    fail_presign: AtomicBool,
    truncate_uploads: AtomicBool,
    put_delay: Option<Duration>,
}

impl MockStorage {
    pub const BUCKET: &'static str = "tubely-test";
    pub const REGION: &'static str = "us-east-1";

    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_uploads: AtomicBool::new(false),
            fail_presign: AtomicBool::new(false),
            truncate_uploads: AtomicBool::new(false),
            put_delay: None,
        }
    }

    /// Sleep this long inside every `put_stream` before reading the body
    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    /// Make every subsequent `put_stream` fail
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Keep only the first half of every subsequent upload while reporting success
    pub fn truncate_uploads(&self, truncate: bool) {
        self.truncate_uploads.store(truncate, Ordering::SeqCst);
    }

    /// Make every subsequent `presigned_get_url` fail
    pub fn fail_presign(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }

    /// Get object data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|o| o.data.clone())
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn bucket(&self) -> &str {
        Self::BUCKET
    }

    fn region(&self) -> Option<&str> {
        Some(Self::REGION)
    }

    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: StorageStream,
    ) -> StorageResult<u64> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "simulated storage outage".to_string(),
            ));
        }
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let size = data.len() as u64;
        if self.truncate_uploads.load(Ordering::SeqCst) {
            data.truncate(data.len() / 2);
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(size)
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "simulated signing failure".to_string(),
            ));
        }
        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}?X-Amz-Expires={}",
            Self::BUCKET,
            Self::REGION,
            key,
            expires_in.as_secs()
        ))
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.data.len() as u64)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
