//! Object storage backends holding both source audio and produced chunks.

mod local;
mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

use crate::config::{StorageBackend, StorageConfig};
use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Common trait for object storage backends
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Fetch an object. Missing or inaccessible objects are `NotFound`.
    async fn download(&self, bucket: &str, path: &str) -> splitforge_common::Result<Bytes>;

    /// Store an object, replacing an existing one when `upsert` is set.
    ///
    /// Failures are reported as [`splitforge_common::Error::Transient`] or
    /// [`splitforge_common::Error::Internal`]; the publisher attaches the
    /// chunk context.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> splitforge_common::Result<()>;
}

/// Create the configured backend
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Supabase => {
            let url = config
                .url
                .as_deref()
                .context("storage.url (SUPABASE_URL) is required")?;
            let key = config
                .service_key
                .as_deref()
                .context("storage.service_key (SUPABASE_SERVICE_ROLE_KEY) is required")?;
            let store = SupabaseStore::new(url, key, Duration::from_secs(config.timeout_secs))?;
            Ok(Arc::new(store))
        }
        StorageBackend::Local => {
            let root = config
                .local_root
                .clone()
                .context("storage.local_root (STORAGE_LOCAL_ROOT) is required")?;
            Ok(Arc::new(LocalStore::new(root)?))
        }
    }
}
