//! Upload orchestration: validate, store, count.

pub mod metrics;
pub mod service;

pub use metrics::{FailureReason, OtelUploadMetrics, UploadMetrics};
pub use service::UploadService;
