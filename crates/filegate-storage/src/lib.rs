//! Filegate Storage Library
//!
//! This crate provides the storage abstraction the upload pipeline writes to,
//! with an S3 backend, a local filesystem backend, and an in-memory mock.
//!
//! # Object keys
//!
//! Every backend names stored objects the same way: a fresh UUID v4 followed by
//! the client filename's extension (`3f2c...9a.png`). Client-supplied names never
//! become path components. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod mock;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use filegate_core::StorageBackend;
pub use keys::generate_object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mock::MockStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
