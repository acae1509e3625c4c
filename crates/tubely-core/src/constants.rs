//! Application-wide constants

/// Multipart form field carrying the video binary.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Prefix for temporary files staged during an upload.
pub const SCRATCH_FILE_PREFIX: &str = "tubely-upload-";

/// Suffix appended to the remuxed (fast-start) copy of an upload.
pub const PROCESSING_SUFFIX: &str = "processing";

/// Number of random bytes in a generated object name.
pub const OBJECT_NAME_RANDOM_BYTES: usize = 32;

/// Target width/height ratio for portrait (9:16) videos.
pub const PORTRAIT_RATIO: f64 = 0.5625;

/// Target width/height ratio for landscape (16:9) videos.
pub const LANDSCAPE_RATIO: f64 = 1.78;

/// Allowed distance from a target ratio for a video to fall in its class.
pub const RATIO_TOLERANCE: f64 = 0.10;
