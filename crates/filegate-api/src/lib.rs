//! Filegate API Library
//!
//! HTTP surface of the upload service: the upload and health handlers, the
//! upload orchestrator, error rendering, and application setup.

pub mod error;
pub mod handlers;
pub mod http_metrics;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{FailureReason, OtelUploadMetrics, UploadMetrics, UploadService};
pub use state::{AppState, UploadLimits};
