use super::metrics::{FailureReason, UploadMetrics};
use filegate_core::{AppError, UploadContext, UploadMetadata, UploadResult};
use filegate_processing::{ContentValidator, ValidationError};
use filegate_storage::{ObjectMetadata, Storage};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncSeek};
use tracing::{field, Instrument};

/// Runs one upload through validation and storage.
///
/// Holds only read-only collaborators; a single instance serves every
/// concurrent request.
pub struct UploadService {
    validator: ContentValidator,
    storage: Arc<dyn Storage>,
    metrics: Arc<dyn UploadMetrics>,
}

impl UploadService {
    pub fn new(
        validator: ContentValidator,
        storage: Arc<dyn Storage>,
        metrics: Arc<dyn UploadMetrics>,
    ) -> Self {
        Self {
            validator,
            storage,
            metrics,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Validate and store `file`.
    ///
    /// The stream is owned by this call and dropped on return, whatever the
    /// outcome. Rejected content never reaches storage. Storage is raced
    /// against the context's cancellation token; a token that is already
    /// cancelled wins before the backend is polled.
    pub async fn create_upload<R>(
        &self,
        ctx: &UploadContext,
        mut file: R,
        metadata: UploadMetadata,
    ) -> Result<UploadResult, AppError>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin,
    {
        let span = tracing::info_span!(
            "upload.create",
            request_id = %ctx.request_id,
            file.name = %metadata.filename,
            file.declared_type = ?metadata.declared_content_type,
            file.declared_size = metadata.declared_size,
            file.type = field::Empty,
            outcome = field::Empty,
        );

        async {
            let validate_span = tracing::info_span!(
                "upload.validate",
                file.type = field::Empty,
                rejection.reason = field::Empty,
            );
            let detected = match self
                .validator
                .inspect(&mut file)
                .instrument(validate_span.clone())
                .await
            {
                Ok(detected) => detected,
                Err(err) => {
                    match &err {
                        ValidationError::Rejected { detected, reason } => {
                            validate_span.record("file.type", detected.as_str());
                            validate_span.record("rejection.reason", reason.as_str());
                            self.metrics.record_rejection(*reason);
                            tracing::warn!(
                                detected_type = %detected,
                                reason = %reason,
                                "Upload rejected by content type policy"
                            );
                            tracing::Span::current().record("outcome", "rejected");
                        }
                        ValidationError::HeaderRead(e) => {
                            self.metrics.record_failure(FailureReason::HeaderRead);
                            tracing::error!(error = %e, "Failed to read upload header");
                            tracing::Span::current().record("outcome", "failed");
                        }
                        ValidationError::Reset(e) => {
                            self.metrics.record_failure(FailureReason::StreamReset);
                            tracing::error!(error = %e, "Failed to reset upload stream");
                            tracing::Span::current().record("outcome", "failed");
                        }
                    }
                    return Err(err.into());
                }
            };

            tracing::Span::current().record("file.type", detected.mime_type.as_str());

            let object = ObjectMetadata::new(metadata.filename.clone(), detected.mime_type.clone());
            let store_span = tracing::info_span!(
                "upload.store",
                storage.backend = %self.storage.backend_type(),
                file.type = %detected.mime_type,
            );
            let store = self.storage.upload(&mut file, &object).instrument(store_span);

            let stored = tokio::select! {
                biased;
                _ = ctx.cancellation.cancelled() => {
                    self.metrics.record_failure(FailureReason::Cancelled);
                    tracing::warn!("Upload cancelled before storage completed");
                    tracing::Span::current().record("outcome", "cancelled");
                    return Err(AppError::Cancelled(
                        "request cancelled or deadline exceeded".to_string(),
                    ));
                }
                result = store => result,
            };

            match stored {
                Ok(stored) => {
                    self.metrics.record_upload(&detected.mime_type, stored.size);
                    tracing::info!(
                        file_id = %stored.key,
                        size_bytes = stored.size,
                        "Upload stored"
                    );
                    tracing::Span::current().record("outcome", "stored");
                    Ok(UploadResult {
                        file_id: stored.key,
                        size: stored.size,
                    })
                }
                Err(e) => {
                    self.metrics.record_failure(FailureReason::Storage);
                    tracing::error!(error = %e, "Storage backend failed");
                    tracing::Span::current().record("outcome", "failed");
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
