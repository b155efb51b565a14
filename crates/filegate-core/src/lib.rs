//! Filegate Core Library
//!
//! This crate provides the error model, configuration, and upload models
//! shared by every Filegate crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorFamily, ErrorMetadata, LogLevel};
pub use models::{UploadContext, UploadMetadata, UploadResult};
pub use storage_types::StorageBackend;
