use super::ObjectStore;
use anyhow::{Context, Result};
use bytes::Bytes;
use splitforge_common::paths::normalize_storage_path;
use splitforge_common::Error;
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed store laid out as `<root>/<bucket>/<path>`
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create storage root {:?}", root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object key onto the filesystem, refusing keys that leave the bucket
    fn object_path(&self, bucket: &str, path: &str) -> splitforge_common::Result<PathBuf> {
        let key = Path::new(normalize_storage_path(path));
        let escapes = key
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == ".." || escapes {
            return Err(Error::not_found(format!("invalid object key {bucket}/{path}")));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn download(&self, bucket: &str, path: &str) -> splitforge_common::Result<Bytes> {
        let file = self.object_path(bucket, path)?;
        match tokio::fs::read(&file).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
                ) =>
            {
                Err(Error::not_found(format!("{bucket}/{path}: {e}")))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        _content_type: &str,
        upsert: bool,
    ) -> splitforge_common::Result<()> {
        let file = self.object_path(bucket, path)?;
        if !upsert && tokio::fs::try_exists(&file).await? {
            return Err(Error::internal(format!("object {bucket}/{path} already exists")));
        }
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file, &data).await?;
        Ok(())
    }
}
