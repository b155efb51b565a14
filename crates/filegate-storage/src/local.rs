use crate::keys::generate_object_key;
use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::Instrument;

const PARTIAL_PREFIX: &str = ".upload-";
const PARTIAL_SUFFIX: &str = ".part";

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`, creating the
    /// directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert a storage key to a filesystem path under the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.contains('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Stream into a temp file beside the target, then
    /// persist it under `target`.
    ///
    /// If this future is dropped mid-copy the temp path is removed with it.
    async fn write_file(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        target: &Path,
    ) -> StorageResult<u64> {
        let partial = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(&self.base_path)?;
        let (file, partial_path) = partial.into_parts();

        let mut file = fs::File::from_std(file);
        let size = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // Rename publishes the object only after the bytes are on disk.
        partial_path.persist(target).map_err(|e| e.error)?;
        Ok(size)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject> {
        let key = generate_object_key(&metadata.filename);
        let span = tracing::info_span!(
            "storage.local.upload",
            file.name = %metadata.filename,
            file.type = %metadata.content_type,
            object.key = %key,
        );

        async move {
            let target = self.key_to_path(&key)?;

            match self.write_file(reader, &target).await {
                Ok(size) => {
                    tracing::debug!(
                        key = %key,
                        size_bytes = size,
                        path = %target.display(),
                        "Local upload successful"
                    );
                    Ok(StoredObject { key, size })
                }
                Err(e) => {
                    tracing::error!(error = %e, key = %key, "Local upload failed");
                    Err(StorageError::UploadFailed(e.to_string()))
                }
            }
        }
        .instrument(span)
        .await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::io::ReadBuf;

    /// Yields some bytes, then fails.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "client went away",
                )));
            }
            self.sent = true;
            buf.put_slice(b"partial bytes");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_local_storage_upload() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"test data".to_vec();
        let mut reader = &data[..];
        let stored = storage
            .upload(&mut reader, &ObjectMetadata::new("test.txt", "text/plain"))
            .await
            .unwrap();

        assert!(stored.key.ends_with(".txt"));
        assert_eq!(stored.size, data.len() as u64);
        let on_disk = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(on_disk, data);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut reader = BrokenReader { sent: false };
        let result = storage
            .upload(&mut reader, &ObjectMetadata::new("a.png", "image/png"))
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Yields one chunk, then never completes.
    struct StallingReader {
        sent: bool,
    }

    impl AsyncRead for StallingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                return Poll::Pending;
            }
            self.sent = true;
            buf.put_slice(b"\x89PNG\r\n\x1a\n partial");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_dropped_upload_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut reader = StallingReader { sent: false };
        let metadata = ObjectMetadata::new("a.png", "image/png");
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            storage.upload(&mut reader, &metadata),
        )
        .await;

        assert!(result.is_err());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "left on disk: {:?}", leftovers);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(matches!(
            storage.key_to_path("../../../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.key_to_path("/etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_creates_missing_base_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = LocalStorage::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
