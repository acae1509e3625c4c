//! Upload pipeline: stage → probe → classify → remux → store → finalize.

mod content_type;
mod error;
mod pipeline;
mod types;

pub use content_type::normalize_content_type;
pub use error::{PipelineStep, UploadError};
pub use pipeline::VideoUploadPipeline;
pub use types::PipelineConfig;
