//! Test helpers for pipeline and API tests
//!
//! Deterministic in-memory stand-ins for the media tools, object storage and
//! metadata store. None of them need ffmpeg, S3 or Postgres.

pub mod fake_tools;
pub mod mock_repositories;
pub mod mock_storage;

pub use fake_tools::{FakeProber, FakeRemuxer};
pub use mock_repositories::MockVideoRepository;
pub use mock_storage::MockStorage;
