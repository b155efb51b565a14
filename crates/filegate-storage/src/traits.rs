//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use filegate_core::AppError;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::storage("failed to store upload", other),
        }
    }
}

/// What the pipeline knows about a file at the moment it is handed to storage.
///
/// `content_type` is the sniffed type, never the client's declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub filename: String,
    pub content_type: String,
}

impl ObjectMetadata {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// A durably stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-assigned identifier, unique per upload.
    pub key: String,
    /// Number of bytes actually written.
    pub size: u64,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem, mock) implement this trait so the
/// upload service never depends on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist the whole of `reader` and return its identifier.
    ///
    /// The reader is consumed from its current position until EOF. A backend
    /// must not return `Ok` until the object is durably stored; on error nothing
    /// may be left addressable under the returned key.
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
