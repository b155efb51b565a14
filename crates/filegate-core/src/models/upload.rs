use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Client-declared facts about an incoming file. None of these are trusted
/// for the type decision; they are recorded for logging and key naming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMetadata {
    pub filename: String,
    pub declared_content_type: Option<String>,
    pub declared_size: u64,
}

impl UploadMetadata {
    pub fn new(filename: impl Into<String>, declared_size: u64) -> Self {
        Self {
            filename: filename.into(),
            declared_content_type: None,
            declared_size,
        }
    }
}

/// Outcome of a successful upload, rendered as the 201 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub size: u64,
}

/// Per-request context threaded through the pipeline.
#[derive(Debug, Clone)]
pub struct UploadContext {
    pub request_id: String,
    pub cancellation: CancellationToken,
}

impl UploadContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Context with a freshly generated correlation ID.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
