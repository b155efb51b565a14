//! Error types module
//!
//! Every failure the upload pipeline can surface is an `AppError`. Each variant
//! knows its HTTP status, a short client-safe message, and a log level; the
//! `Display` output and the wrapped source are diagnostics for logs only.

use std::error::Error as StdError;

/// Boxed cause carried by errors that wrap a lower-level failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Fixed message for failures that must not reveal anything about their cause.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for policy rejections worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Which side of the boundary caused the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFamily {
    /// Client-caused: disallowed content, malformed or oversized request (4xx).
    Policy,
    /// Environment-caused: stream I/O, storage backend, internal faults (5xx).
    Operational,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message; never contains internals
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Error family, derived from the status code only
    fn family(&self) -> ErrorFamily {
        match self.http_status_code() {
            400..=499 => ErrorFamily::Policy,
            _ => ErrorFamily::Operational,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File type {detected} is not allowed")]
    DisallowedFileType { detected: String },

    #[error("Malformed upload: {message}")]
    MalformedInput {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Failed to read file header: {0}")]
    StreamIo(#[source] std::io::Error),

    #[error("Failed to reset file reader: {0}")]
    StreamReset(#[source] std::io::Error),

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Upload cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AppError::MalformedInput {
            message: message.into(),
            source: None,
        }
    }

    pub fn malformed_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        AppError::MalformedInput {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn storage(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DisallowedFileType { .. } => "DisallowedFileType",
            AppError::MalformedInput { .. } => "MalformedInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::StreamIo(_) => "StreamIo",
            AppError::StreamReset(_) => "StreamReset",
            AppError::Storage { .. } => "Storage",
            AppError::Cancelled(_) => "Cancelled",
            AppError::Config(_) => "Config",
            AppError::Internal { .. } => "Internal",
        }
    }

    /// Internal diagnostic message (logs only)
    pub fn internal_message(&self) -> String {
        self.to_string()
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::DisallowedFileType { .. } => (400, "INVALID_FILE_TYPE", LogLevel::Warn),
        AppError::MalformedInput { .. } => (400, "MALFORMED_INPUT", LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", LogLevel::Debug),
        AppError::StreamIo(_) => (500, "STREAM_IO_ERROR", LogLevel::Error),
        AppError::StreamReset(_) => (500, "STREAM_RESET_ERROR", LogLevel::Error),
        AppError::Storage { .. } => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::Cancelled(_) => (500, "UPLOAD_CANCELLED", LogLevel::Warn),
        AppError::Config(_) => (500, "CONFIG_ERROR", LogLevel::Error),
        AppError::Internal { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::DisallowedFileType { .. } => "Invalid File Type".to_string(),
            AppError::MalformedInput { .. } => "Error Reading File".to_string(),
            AppError::PayloadTooLarge(_) => "File exceeds the maximum allowed size".to_string(),
            AppError::StreamIo(_) | AppError::StreamReset(_) => {
                "Failed to read uploaded file".to_string()
            }
            AppError::Storage { .. } => "Failed to store file".to_string(),
            AppError::Cancelled(_) => "Upload was cancelled".to_string(),
            AppError::Config(_) => "Application configuration error".to_string(),
            AppError::Internal { .. } => GENERIC_INTERNAL_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_disallowed_type_is_policy_failure() {
        let err = AppError::DisallowedFileType {
            detected: "text/plain".to_string(),
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_FILE_TYPE");
        assert_eq!(err.family(), ErrorFamily::Policy);
        assert_eq!(err.client_message(), "Invalid File Type");
        assert!(!err.client_message().contains("text/plain"));
        assert!(err.internal_message().contains("text/plain"));
    }

    #[test]
    fn test_payload_too_large_is_policy_failure() {
        let err = AppError::PayloadTooLarge("20971520 bytes exceeds 10485760".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.family(), ErrorFamily::Policy);
        assert!(!err.client_message().contains("20971520"));
    }

    #[test]
    fn test_stream_errors_are_operational() {
        let read = AppError::StreamIo(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        let reset = AppError::StreamReset(io::Error::new(io::ErrorKind::Other, "seek"));
        assert_eq!(read.family(), ErrorFamily::Operational);
        assert_eq!(reset.family(), ErrorFamily::Operational);
        assert_ne!(read.error_code(), reset.error_code());
    }

    #[test]
    fn test_storage_error_hides_backend_details() {
        let cause = io::Error::new(
            io::ErrorKind::PermissionDenied,
            "AccessDenied for bucket secret-bucket",
        );
        let err = AppError::storage("failed to upload file to S3", cause);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Failed to store file");
        assert!(err.detailed_message().contains("secret-bucket"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_anyhow_defaults_to_generic_internal() {
        let err: AppError = anyhow::anyhow!("db password=hunter2 rejected").into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.client_message(), GENERIC_INTERNAL_MESSAGE);
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_detailed_message_walks_source_chain() {
        let err = AppError::malformed_with_source(
            "multipart stream ended early",
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        );
        let details = err.detailed_message();
        assert!(details.starts_with("Malformed upload: multipart stream ended early"));
        assert!(details.contains("Caused by: eof"));
    }
}
