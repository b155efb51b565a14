use filegate_core::constants::{SNIFF_WINDOW_BYTES, UNKNOWN_CONTENT_TYPE};
use filegate_core::AppError;
use std::fmt;
use std::io::{self, SeekFrom};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Why content was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No known signature matched the header window.
    UnknownType,
    /// A signature matched but the type is not on the allow-list.
    DisallowedType,
}

impl RejectionReason {
    /// Stable tag value for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::UnknownType => "unknown_type",
            RejectionReason::DisallowedType => "disallowed_type",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for uploaded content
///
/// `HeaderRead` and `Reset` are stream faults; only `Rejected` is a verdict on
/// the content itself.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Failed to read file header: {0}")]
    HeaderRead(#[source] io::Error),

    #[error("Failed to reset stream to start: {0}")]
    Reset(#[source] io::Error),

    #[error("Content type {detected} rejected ({reason})")]
    Rejected {
        detected: String,
        reason: RejectionReason,
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::HeaderRead(e) => AppError::StreamIo(e),
            ValidationError::Reset(e) => AppError::StreamReset(e),
            ValidationError::Rejected { detected, .. } => AppError::DisallowedFileType { detected },
        }
    }
}

/// A content type identified from magic bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedType {
    pub mime_type: String,
}

/// Magic-byte content validator
///
/// Holds the read-only allow-list; shared by all concurrent uploads.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    allowed_content_types: Vec<String>,
}

impl ContentValidator {
    pub fn new(allowed_content_types: Vec<String>) -> Self {
        Self {
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }

    /// Classify a header window. `None` means no known signature matched.
    pub fn detect(header: &[u8]) -> Option<DetectedType> {
        infer::get(header).map(|kind| DetectedType {
            mime_type: kind.mime_type().to_string(),
        })
    }

    /// Inspect the stream and leave it positioned at byte 0.
    ///
    /// Reads at most the sniffing window, seeks back to the start, then checks
    /// the detected type against the allow-list. The seek happens before the
    /// verdict so a reset failure is always reported as a stream fault.
    pub async fn inspect<R>(&self, reader: &mut R) -> Result<DetectedType, ValidationError>
    where
        R: AsyncRead + AsyncSeek + Unpin + ?Sized,
    {
        let header = read_header(reader).await?;

        reader
            .seek(SeekFrom::Start(0))
            .await
            .map_err(ValidationError::Reset)?;

        let detected = match Self::detect(&header) {
            Some(detected) => detected,
            None => {
                tracing::debug!(header_len = header.len(), "No known signature in header");
                return Err(ValidationError::Rejected {
                    detected: UNKNOWN_CONTENT_TYPE.to_string(),
                    reason: RejectionReason::UnknownType,
                });
            }
        };

        if !self.is_allowed(&detected.mime_type) {
            return Err(ValidationError::Rejected {
                detected: detected.mime_type,
                reason: RejectionReason::DisallowedType,
            });
        }

        Ok(detected)
    }
}

/// Read up to the sniffing window, stopping early at end of stream.
async fn read_header<R>(reader: &mut R) -> Result<Vec<u8>, ValidationError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = vec![0u8; SNIFF_WINDOW_BYTES];
    let mut filled = 0;

    while filled < header.len() {
        let n = reader
            .read(&mut header[filled..])
            .await
            .map_err(ValidationError::HeaderRead)?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    header.truncate(filled);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const PDF_MAGIC: &[u8] = b"%PDF-1.7\n";

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut data = PNG_MAGIC.to_vec();
        data.extend((0..len.saturating_sub(PNG_MAGIC.len())).map(|i| (i % 251) as u8));
        data
    }

    fn validator(types: &[&str]) -> ContentValidator {
        ContentValidator::new(types.iter().map(|t| t.to_string()).collect())
    }

    /// Readable stream whose seek always fails.
    struct UnseekableReader {
        inner: Cursor<Vec<u8>>,
    }

    impl AsyncRead for UnseekableReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl AsyncSeek for UnseekableReader {
        fn start_seek(self: Pin<&mut Self>, _position: SeekFrom) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "stream is not seekable"))
        }

        fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
            Poll::Ready(Ok(0))
        }
    }

    /// Hands out one byte per read call.
    struct TrickleReader {
        inner: Cursor<Vec<u8>>,
    }

    impl AsyncRead for TrickleReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let mut one = [0u8; 1];
            let mut small = ReadBuf::new(&mut one);
            match Pin::new(&mut self.inner).poll_read(cx, &mut small) {
                Poll::Ready(Ok(())) => {
                    buf.put_slice(small.filled());
                    Poll::Ready(Ok(()))
                }
                other => other,
            }
        }
    }

    #[tokio::test]
    async fn test_png_accepted_and_stream_reset() {
        let data = png_bytes(4096);
        let mut cursor = Cursor::new(data.clone());

        let detected = validator(&["image/png"]).inspect(&mut cursor).await.unwrap();
        assert_eq!(detected.mime_type, "image/png");

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, data);
    }

    #[tokio::test]
    async fn test_pdf_accepted() {
        let mut data = PDF_MAGIC.to_vec();
        data.extend_from_slice(b"1 0 obj\n<<>>\nendobj\n");
        let mut cursor = Cursor::new(data);

        let detected = validator(&["application/pdf"])
            .inspect(&mut cursor)
            .await
            .unwrap();
        assert_eq!(detected.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_plain_text_rejected_as_unknown() {
        let mut cursor = Cursor::new(b"just some plain text, nothing magic here".to_vec());

        let err = validator(&["image/png"]).inspect(&mut cursor).await.unwrap_err();
        match err {
            ValidationError::Rejected { detected, reason } => {
                assert_eq!(detected, "unknown");
                assert_eq!(reason, RejectionReason::UnknownType);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_known_but_disallowed_type_rejected() {
        let mut cursor = Cursor::new(png_bytes(512));

        let err = validator(&["application/pdf"])
            .inspect(&mut cursor)
            .await
            .unwrap_err();
        match err {
            ValidationError::Rejected { detected, reason } => {
                assert_eq!(detected, "image/png");
                assert_eq!(reason, RejectionReason::DisallowedType);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_stream_is_unknown() {
        let mut cursor = Cursor::new(Vec::new());
        let err = validator(&["image/png"]).inspect(&mut cursor).await.unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Rejected {
                reason: RejectionReason::UnknownType,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stream_shorter_than_window() {
        let data = png_bytes(PNG_MAGIC.len());
        assert!(data.len() < SNIFF_WINDOW_BYTES);
        let mut cursor = Cursor::new(data.clone());

        validator(&["image/png"]).inspect(&mut cursor).await.unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[tokio::test]
    async fn test_header_window_filled_across_short_reads() {
        let data = png_bytes(SNIFF_WINDOW_BYTES * 2);
        let mut reader = TrickleReader {
            inner: Cursor::new(data),
        };

        let header = read_header(&mut reader).await.unwrap();
        assert_eq!(header.len(), SNIFF_WINDOW_BYTES);
    }

    #[tokio::test]
    async fn test_seek_failure_is_stream_fault_not_rejection() {
        let mut reader = UnseekableReader {
            inner: Cursor::new(png_bytes(1024)),
        };

        let err = validator(&["image/png"]).inspect(&mut reader).await.unwrap_err();
        assert!(matches!(err, ValidationError::Reset(_)));
    }

    #[test]
    fn test_errors_map_to_distinct_families() {
        use filegate_core::{ErrorFamily, ErrorMetadata};

        let rejected: AppError = ValidationError::Rejected {
            detected: "image/bmp".to_string(),
            reason: RejectionReason::DisallowedType,
        }
        .into();
        assert_eq!(rejected.family(), ErrorFamily::Policy);

        let reset: AppError =
            ValidationError::Reset(io::Error::new(io::ErrorKind::Other, "seek")).into();
        assert_eq!(reset.family(), ErrorFamily::Operational);
        assert_eq!(reset.http_status_code(), 500);
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let v = validator(&[" Image/PNG "]);
        assert!(v.is_allowed("image/png"));
        assert!(!v.is_allowed("image/jpeg"));
    }
}
