use super::ObjectStore;
use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{header, Client, Url};
use splitforge_av::tail_chars;
use splitforge_common::Error;
use std::time::Duration;

/// Longest backend error body echoed into an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for the Supabase Storage REST API
pub struct SupabaseStore {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(url: &str, service_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(url.trim_end_matches('/'))
            .with_context(|| format!("Invalid Supabase URL: {}", url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid Supabase URL: {}", url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build storage HTTP client")?;

        Ok(Self {
            client,
            base_url,
            service_key: service_key.to_string(),
        })
    }

    /// `{base}/storage/v1/object/{bucket}/{path}` with each segment percent-encoded
    fn object_url(&self, bucket: &str, path: &str) -> splitforge_common::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::internal("storage URL cannot be a base"))?
            .pop_if_empty()
            .extend(["storage", "v1", "object", bucket])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    tail_chars(body.trim(), MAX_ERROR_BODY_CHARS).to_string()
}

#[async_trait::async_trait]
impl ObjectStore for SupabaseStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn download(&self, bucket: &str, path: &str) -> splitforge_common::Result<Bytes> {
        let url = self.object_url(bucket, path)?;
        tracing::debug!("Supabase download {}/{}", bucket, path);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| Error::transient(format!("Supabase download request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(Error::not_found(format!(
                "Supabase download of {bucket}/{path} failed with HTTP {status}: {body}"
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::transient(format!("Supabase download interrupted: {e}")))?;

        if data.is_empty() {
            return Err(Error::not_found(format!(
                "Supabase download of {bucket}/{path} returned no data (object not found?)"
            )));
        }

        Ok(data)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> splitforge_common::Result<()> {
        let url = self.object_url(bucket, path)?;
        tracing::debug!("Supabase upload {}/{} ({} bytes)", bucket, path, data.len());

        let response = self
            .authorized(self.client.post(url))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(data)
            .send()
            .await
            .map_err(|e| Error::transient(format!("Supabase upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(Error::internal(format!("HTTP {status}: {body}")));
        }

        Ok(())
    }
}
