//! Tubely processing library
//!
//! The upload-to-storage pipeline: stage the incoming stream to a scratch file,
//! probe its geometry with ffprobe, remux it for fast start with ffmpeg, store it
//! under an aspect-derived key and point the owning video record at it.

pub mod scratch;
pub mod upload;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use scratch::ScratchFile;
pub use upload::{normalize_content_type, PipelineConfig, PipelineStep, UploadError, VideoUploadPipeline};
pub use video::{
    classify, FfmpegRemuxer, FfprobeProber, GeometryProber, ProbeError, RemuxError,
    StreamRemuxer, VideoGeometry,
};
