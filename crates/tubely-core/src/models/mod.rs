//! Data models for the application

mod aspect;
mod video;

pub use aspect::*;
pub use video::*;
