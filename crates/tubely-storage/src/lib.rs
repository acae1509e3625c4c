//! Tubely Storage Library
//!
//! This crate provides the object storage abstraction and implementations for Tubely.
//! It includes the Storage trait and implementations for S3 and local filesystem.
//!
//! # Storage key format
//!
//! Processed videos are stored under a prefix chosen by their aspect class:
//!
//! - `landscape/{name}.{ext}`
//! - `portrait/{name}.{ext}`
//! - `other/{name}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{build_object_key, extension_for_content_type, generate_object_name};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StorageStream};
pub use tubely_core::StorageBackend;
