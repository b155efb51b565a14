//! In-memory metrics sink for assertions.

use filegate_api::{FailureReason, UploadMetrics};
use filegate_processing::RejectionReason;
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingMetrics {
    uploads: Mutex<Vec<(String, u64)>>,
    rejections: Mutex<Vec<RejectionReason>>,
    failures: Mutex<Vec<FailureReason>>,
}

impl RecordingMetrics {
    pub fn uploads(&self) -> Vec<(String, u64)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn rejections(&self) -> Vec<RejectionReason> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<FailureReason> {
        self.failures.lock().unwrap().clone()
    }
}

impl UploadMetrics for RecordingMetrics {
    fn record_upload(&self, content_type: &str, size: u64) {
        self.uploads
            .lock()
            .unwrap()
            .push((content_type.to_string(), size));
    }

    fn record_rejection(&self, reason: RejectionReason) {
        self.rejections.lock().unwrap().push(reason);
    }

    fn record_failure(&self, reason: FailureReason) {
        self.failures.lock().unwrap().push(reason);
    }
}
