//! Fast-start remuxing with ffmpeg
//!
//! Rewrites the container so the index (moov atom) sits before the media data.
//! Streams are copied, never re-encoded.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tubely_core::constants::PROCESSING_SUFFIX;

#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("Failed to execute ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {status}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },
}

/// Path of the remuxed copy for `output_base`: `<output_base>.processing`.
pub fn processing_path(output_base: &Path) -> PathBuf {
    let mut name = OsString::from(output_base.as_os_str());
    name.push(".");
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

#[async_trait]
pub trait StreamRemuxer: Send + Sync {
    /// Write a fast-start copy of `input` to [`processing_path`]`(output_base)` and return that path.
    async fn remux_faststart(&self, input: &Path, output_base: &Path)
        -> Result<PathBuf, RemuxError>;
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn build_args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-c".into(),
            "copy".into(),
            "-movflags".into(),
            "faststart".into(),
            "-f".into(),
            "mp4".into(),
            output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl StreamRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux_faststart"
    ))]
    async fn remux_faststart(
        &self,
        input: &Path,
        output_base: &Path,
    ) -> Result<PathBuf, RemuxError> {
        let start = std::time::Instant::now();
        let output_path = processing_path(output_base);

        let output = Command::new(&self.ffmpeg_path)
            .args(Self::build_args(input, &output_path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RemuxError::Spawn)?;

        if !output.status.success() {
            return Err(RemuxError::Failed {
                status: output.status.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_path_appends_suffix() {
        let path = processing_path(Path::new("/tmp/abc_DEF-123"));
        assert_eq!(path, PathBuf::from("/tmp/abc_DEF-123.processing"));
    }

    #[test]
    fn test_args_copy_streams_with_faststart() {
        let args = FfmpegRemuxer::build_args(Path::new("/in.mp4"), Path::new("/out.processing"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let joined = args.join(" ");
        assert!(joined.contains("-i /in.mp4"));
        assert!(joined.contains("-c copy"));
        assert!(joined.contains("-movflags faststart"));
        assert!(joined.ends_with("-f mp4 /out.processing"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let remuxer = FfmpegRemuxer::new("/nonexistent/ffmpeg-binary");
        let result = remuxer
            .remux_faststart(Path::new("/tmp/in.mp4"), Path::new("/tmp/out"))
            .await;
        assert!(matches!(result, Err(RemuxError::Spawn(_))));
    }
}
