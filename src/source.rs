//! Source resolution: turn a storage path or URL into the raw input bytes.
//!
//! References beginning with `http://` or `https://` are fetched directly;
//! anything else is treated as a key in the object store bucket.

use crate::config::FetchConfig;
use crate::storage::ObjectStore;
use anyhow::Context;
use bytes::Bytes;
use reqwest::{header, Client};
use splitforge_common::paths::{is_http_url, normalize_storage_path};
use splitforge_common::{Error, Result};
use std::sync::Arc;

/// Fetches source audio from a URL or the storage backend
#[derive(Clone)]
pub struct SourceResolver {
    http: Client,
    store: Arc<dyn ObjectStore>,
}

impl SourceResolver {
    pub fn new(store: Arc<dyn ObjectStore>, fetch: &FetchConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(fetch.timeout())
            .user_agent(fetch.user_agent.clone())
            .build()
            .context("Failed to build download HTTP client")?;

        Ok(Self { http, store })
    }

    /// Retrieve the bytes behind `reference`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the object is missing, access is denied, or a
    /// URL answers with a non-success status; [`Error::Transient`] on
    /// connection-level failures.
    pub async fn resolve(&self, bucket: &str, reference: &str) -> Result<Bytes> {
        let reference = reference.trim();

        if is_http_url(reference) {
            return self.fetch_url(reference).await;
        }

        let path = normalize_storage_path(reference);
        if path.is_empty() {
            return Err(Error::not_found("empty storage path"));
        }

        tracing::debug!("Downloading {}/{} from {}", bucket, path, self.store.name());
        self.store.download(bucket, path).await
    }

    async fn fetch_url(&self, url: &str) -> Result<Bytes> {
        tracing::debug!("Fetching source over HTTP: {}", redact_query(url));

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| Error::transient(format!("HTTP download error: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::not_found(format!("HTTP download failed: {status}")));
        }

        let data = response.bytes().await.map_err(|e| {
            Error::transient(format!("HTTP download interrupted: {}", e.without_url()))
        })?;

        Ok(data)
    }
}

/// Drop the query string so signed-URL tokens stay out of logs
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Store that must never be reached
    struct UnreachableStore;

    #[async_trait::async_trait]
    impl ObjectStore for UnreachableStore {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn download(&self, _bucket: &str, _path: &str) -> Result<Bytes> {
            panic!("storage backend should not be used for URLs");
        }

        async fn upload(
            &self,
            _bucket: &str,
            _path: &str,
            _data: Bytes,
            _content_type: &str,
            _upsert: bool,
        ) -> Result<()> {
            panic!("upload should not be called");
        }
    }

    fn resolver(store: Arc<dyn ObjectStore>) -> SourceResolver {
        SourceResolver::new(store, &FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn url_bypasses_storage_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/signed/meeting.m4a"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote-audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/signed/meeting.m4a?token=abc", server.uri());
        let data = resolver(Arc::new(UnreachableStore))
            .resolve("audio-files", &url)
            .await
            .unwrap();
        assert_eq!(&data[..], b"remote-audio");
    }

    #[tokio::test]
    async fn url_error_status_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/expired.m4a", server.uri());
        let err = resolver(Arc::new(UnreachableStore))
            .resolve("audio-files", &url)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn url_connection_failure_is_transient() {
        let err = resolver(Arc::new(UnreachableStore))
            .resolve("audio-files", "http://127.0.0.1:1/a.m4a")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transient(_)));
    }

    #[tokio::test]
    async fn storage_path_strips_leading_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::storage::LocalStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::create_dir_all(dir.path().join("audio-files/uploads")).unwrap();
        std::fs::write(dir.path().join("audio-files/uploads/meeting.m4a"), b"local").unwrap();

        let data = resolver(Arc::new(store))
            .resolve("audio-files", "  /uploads/meeting.m4a")
            .await
            .unwrap();
        assert_eq!(&data[..], b"local");
    }

    #[test]
    fn redacts_query_string() {
        assert_eq!(redact_query("https://h/a.m4a?token=s"), "https://h/a.m4a");
        assert_eq!(redact_query("https://h/a.m4a"), "https://h/a.m4a");
    }
}
