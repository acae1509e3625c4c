//! Database repositories for data access layer

pub mod video;

pub use video::{PgVideoRepository, VideoRepository, VideoRow};
