//! Upload produced chunks to the storage backend.

use crate::storage::ObjectStore;
use bytes::Bytes;
use splitforge_av::CHUNK_CONTENT_TYPE;
use splitforge_common::paths::remote_chunk_path;
use splitforge_common::{Error, Result};
use std::path::PathBuf;

/// Upload each chunk to `{base_dir}/{file name}` in `bucket`, in order,
/// replacing any object already stored there.
///
/// Stops at the first failure. Chunks uploaded before the failure stay in
/// place; a rerun of the same request overwrites them.
pub async fn publish(
    store: &dyn ObjectStore,
    bucket: &str,
    base_dir: &str,
    files: &[PathBuf],
) -> Result<Vec<String>> {
    let mut remote_paths = Vec::with_capacity(files.len());

    for file in files {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::internal(format!("chunk path has no file name: {:?}", file)))?;
        let remote_path = remote_chunk_path(base_dir, &file_name);

        let upload_error = |message: String| Error::Upload {
            file: file_name.clone(),
            bucket: bucket.to_string(),
            path: remote_path.clone(),
            message,
        };

        let data = tokio::fs::read(file)
            .await
            .map_err(|e| upload_error(format!("failed to read chunk: {e}")))?;

        store
            .upload(
                bucket,
                &remote_path,
                Bytes::from(data),
                CHUNK_CONTENT_TYPE,
                true,
            )
            .await
            .map_err(|e| upload_error(e.detail()))?;

        tracing::debug!("Uploaded {} to {}/{}", file_name, bucket, remote_path);
        remote_paths.push(remote_path);
    }

    Ok(remote_paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts `limit` uploads, then fails every call
    struct FailingAfter {
        limit: usize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ObjectStore for FailingAfter {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn download(&self, _bucket: &str, _path: &str) -> Result<Bytes> {
            Err(Error::not_found("unused"))
        }

        async fn upload(
            &self,
            _bucket: &str,
            _path: &str,
            _data: Bytes,
            _content_type: &str,
            _upsert: bool,
        ) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.limit {
                return Err(Error::internal("HTTP 500 Internal Server Error: boom"));
            }
            Ok(())
        }
    }

    fn write_chunks(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("part_{i:03}.m4a"));
                std::fs::write(&path, format!("chunk-{i}")).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn publishes_in_order_under_base_dir() {
        let chunks_dir = tempfile::tempdir().unwrap();
        let storage_dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(storage_dir.path().to_path_buf()).unwrap();
        let files = write_chunks(chunks_dir.path(), 3);

        let parts = publish(&store, "audio-files", "audio-chunks/abc123", &files)
            .await
            .unwrap();

        assert_eq!(
            parts,
            [
                "audio-chunks/abc123/part_000.m4a",
                "audio-chunks/abc123/part_001.m4a",
                "audio-chunks/abc123/part_002.m4a",
            ]
        );
        let stored = storage_dir
            .path()
            .join("audio-files/audio-chunks/abc123/part_001.m4a");
        assert_eq!(std::fs::read_to_string(stored).unwrap(), "chunk-1");
    }

    #[tokio::test]
    async fn republishing_overwrites_same_paths() {
        let chunks_dir = tempfile::tempdir().unwrap();
        let storage_dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(storage_dir.path().to_path_buf()).unwrap();
        let files = write_chunks(chunks_dir.path(), 2);

        let first = publish(&store, "b", "p/id", &files).await.unwrap();
        let second = publish(&store, "b", "p/id", &files).await.unwrap();
        assert_eq!(first, second);

        let count = std::fs::read_dir(storage_dir.path().join("b/p/id"))
            .unwrap()
            .count();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let chunks_dir = tempfile::tempdir().unwrap();
        let files = write_chunks(chunks_dir.path(), 3);
        let store = FailingAfter {
            limit: 1,
            calls: Default::default(),
        };

        let err = publish(&store, "audio-files", "audio-chunks/abc", &files)
            .await
            .unwrap_err();

        match err {
            Error::Upload {
                file,
                bucket,
                path,
                message,
            } => {
                assert_eq!(file, "part_001.m4a");
                assert_eq!(bucket, "audio-files");
                assert_eq!(path, "audio-chunks/abc/part_001.m4a");
                assert_eq!(message, "HTTP 500 Internal Server Error: boom");
            }
            other => panic!("expected upload error, got {other:?}"),
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }
}
