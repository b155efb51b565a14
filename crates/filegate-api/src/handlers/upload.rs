use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use filegate_core::constants::UPLOAD_FIELD_NAME;
use filegate_core::{AppError, UploadContext, UploadMetadata, UploadResult};
use filegate_infra::RequestId;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::malformed_with_source("failed to read multipart body", err)
    }
}

fn spool_error(err: std::io::Error) -> AppError {
    AppError::Internal {
        message: "failed to spool upload to temporary file".to_string(),
        source: Some(Box::new(err)),
    }
}

/// Copy the single `uploadFile` field into an anonymous temp file.
///
/// The returned file is rewound to byte 0. Other fields are skipped; a second
/// `uploadFile` field is malformed input.
async fn spool_upload_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<(File, UploadMetadata), AppError> {
    let mut spooled: Option<(File, UploadMetadata)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        if spooled.is_some() {
            return Err(AppError::malformed(format!(
                "more than one '{}' field",
                UPLOAD_FIELD_NAME
            )));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let declared_content_type = field.content_type().map(str::to_string);

        // Unlinked on creation; the OS reclaims it when the handle drops.
        let mut file = File::from_std(tempfile::tempfile().map_err(spool_error)?);
        let mut written: usize = 0;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            written += chunk.len();
            if written > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "'{}' exceeds {} bytes",
                    filename, max_bytes
                )));
            }
            file.write_all(&chunk).await.map_err(spool_error)?;
        }

        file.flush().await.map_err(spool_error)?;
        file.seek(SeekFrom::Start(0)).await.map_err(spool_error)?;

        let metadata = UploadMetadata {
            filename,
            declared_content_type,
            declared_size: written as u64,
        };
        spooled = Some((file, metadata));
    }

    spooled.ok_or_else(|| {
        AppError::malformed(format!("missing '{}' field", UPLOAD_FIELD_NAME))
    })
}

/// Accept one file from a multipart form, validate its real type and store it.
#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.as_str(), operation = "upload_file")
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResult>), HttpAppError> {
    let multipart = multipart.map_err(|e| {
        AppError::malformed_with_source("expected a multipart/form-data body", e)
    })?;

    let (file, metadata) =
        spool_upload_field(multipart, state.limits.max_file_size_bytes).await?;

    tracing::info!(
        filename = %metadata.filename,
        declared_type = ?metadata.declared_content_type,
        declared_size = metadata.declared_size,
        "Upload received"
    );

    let ctx = UploadContext::new(request_id.0);
    // Client disconnect drops this future; the guard then cancels the token.
    let _cancel_on_drop = ctx.cancellation.clone().drop_guard();

    let upload = state.upload_service.create_upload(&ctx, file, metadata);
    tokio::pin!(upload);

    let result = tokio::select! {
        result = &mut upload => result,
        _ = tokio::time::sleep(state.limits.timeout) => {
            tracing::warn!(
                timeout_secs = state.limits.timeout.as_secs(),
                "Upload deadline exceeded"
            );
            ctx.cancellation.cancel();
            upload.await
        }
    }?;

    Ok((StatusCode::CREATED, Json(result)))
}
