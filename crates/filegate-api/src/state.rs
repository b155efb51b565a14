//! Application state shared by all handlers.

use crate::services::upload::UploadService;
use filegate_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// Per-request upload limits taken from configuration.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size_bytes: usize,
    pub timeout: Duration,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes(),
            timeout: Duration::from_secs(config.upload_timeout_secs),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub limits: UploadLimits,
}

impl AppState {
    pub fn new(upload_service: Arc<UploadService>, limits: UploadLimits) -> Self {
        Self {
            upload_service,
            limits,
        }
    }
}
