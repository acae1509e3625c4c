//! Fakes for ffprobe and ffmpeg

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::video::{
    processing_path, GeometryProber, ProbeError, RemuxError, StreamRemuxer, VideoGeometry,
};

/// Prober that reports a fixed geometry (or fails) without running ffprobe
pub struct FakeProber {
    geometry: Mutex<Option<VideoGeometry>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            geometry: Mutex::new(Some(VideoGeometry { width, height })),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Prober that always fails as if the file had no streams
    pub fn failing() -> Self {
        Self {
            geometry: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_geometry(&self, geometry: VideoGeometry) {
        *self.geometry.lock().unwrap() = Some(geometry);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeometryProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<VideoGeometry, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if !path.exists() {
            return Err(ProbeError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let geometry = *self.geometry.lock().unwrap();
        geometry.ok_or(ProbeError::NoStreams)
    }
}

/// Remuxer that copies the input behind a marker, or fails after writing a partial file
pub struct FakeRemuxer {
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeRemuxer {
    /// Prefix written ahead of the copied input
    pub const FASTSTART_MARKER: &'static [u8] = b"FASTSTART";

    pub fn new() -> Self {
        Self {
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Remuxer that exits non-zero with `stderr`
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            failure: Some(stderr.into()),
            ..Self::new()
        }
    }

    /// Write a partial output, then sleep this long before finishing
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most remuxes observed running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), RemuxError> {
        if self.delay.is_some() || self.failure.is_some() {
            tokio::fs::write(output, b"partial")
                .await
                .map_err(RemuxError::Spawn)?;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(stderr) = &self.failure {
            return Err(RemuxError::Failed {
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        let data = tokio::fs::read(input).await.map_err(RemuxError::Spawn)?;
        let mut remuxed = Self::FASTSTART_MARKER.to_vec();
        remuxed.extend_from_slice(&data);
        tokio::fs::write(output, remuxed)
            .await
            .map_err(RemuxError::Spawn)
    }
}

/// Decrements the in-flight count even when the remux future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for FakeRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamRemuxer for FakeRemuxer {
    async fn remux_faststart(
        &self,
        input: &Path,
        output_base: &Path,
    ) -> Result<PathBuf, RemuxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let output = processing_path(output_base);
        self.run(input, &output).await?;
        Ok(output)
    }
}
