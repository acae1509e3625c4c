//! Tubely database layer
//!
//! Repositories for the video metadata store. The upload pipeline depends on the
//! [`VideoRepository`] trait only; [`PgVideoRepository`] is the Postgres implementation.

pub mod db;

pub use db::{PgVideoRepository, VideoRepository};
