//! Upload pipeline metrics
//!
//! Tag values are drawn from small fixed sets (detected content type from the
//! allow-list, rejection and failure reasons). Filenames and object keys never
//! become tag values.

use filegate_processing::RejectionReason;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

/// Why an accepted-or-pending upload failed for operational reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    HeaderRead,
    StreamReset,
    Storage,
    Cancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::HeaderRead => "header_read",
            FailureReason::StreamReset => "stream_reset",
            FailureReason::Storage => "storage",
            FailureReason::Cancelled => "cancelled",
        }
    }
}

/// Sink for upload outcome counters.
pub trait UploadMetrics: Send + Sync {
    /// A file was durably stored.
    fn record_upload(&self, content_type: &str, size: u64);

    /// Content was refused by the type policy.
    fn record_rejection(&self, reason: RejectionReason);

    /// The pipeline failed for an operational reason.
    fn record_failure(&self, reason: FailureReason);
}

/// OpenTelemetry-backed upload metrics.
#[derive(Clone)]
pub struct OtelUploadMetrics {
    uploads: Counter<u64>,
    upload_size: Histogram<u64>,
    rejections: Counter<u64>,
    failures: Counter<u64>,
}

impl OtelUploadMetrics {
    pub fn new(meter: &Meter) -> Self {
        let uploads = meter
            .u64_counter("file.uploads.total")
            .with_description("Total number of files stored")
            .build();

        let upload_size = meter
            .u64_histogram("file.upload.size")
            .with_description("Size of stored files")
            .with_unit("By")
            .build();

        let rejections = meter
            .u64_counter("file.rejections.total")
            .with_description("Total number of uploads refused by the content type policy")
            .build();

        let failures = meter
            .u64_counter("file.upload.failures.total")
            .with_description("Total number of uploads that failed for operational reasons")
            .build();

        Self {
            uploads,
            upload_size,
            rejections,
            failures,
        }
    }

    /// Metrics bound to the process-wide meter provider.
    pub fn global() -> Self {
        Self::new(&opentelemetry::global::meter("filegate"))
    }
}

impl UploadMetrics for OtelUploadMetrics {
    fn record_upload(&self, content_type: &str, size: u64) {
        let labels = [KeyValue::new("content_type", content_type.to_string())];
        self.uploads.add(1, &labels);
        self.upload_size.record(size, &labels);
    }

    fn record_rejection(&self, reason: RejectionReason) {
        self.rejections
            .add(1, &[KeyValue::new("reason", reason.as_str())]);
    }

    fn record_failure(&self, reason: FailureReason) {
        self.failures
            .add(1, &[KeyValue::new("reason", reason.as_str())]);
    }
}
