//! Video inspection and repackaging backed by the ffmpeg tool suite

pub mod aspect;
pub mod probe;
pub mod remux;

pub use aspect::{classify, classify_ratio};
pub use probe::{FfprobeProber, GeometryProber, ProbeError, VideoGeometry};
pub use remux::{processing_path, FfmpegRemuxer, RemuxError, StreamRemuxer};
