//! Request orchestration: resolve the source, split it, publish the chunks.
//!
//! Each request runs linearly through [`SplitStage`]s. The scratch workspace
//! is owned by the request future, so it is removed on success, on error,
//! and when the future is dropped because the caller went away.

use crate::config::Config;
use crate::publish::publish;
use crate::source::SourceResolver;
use crate::storage::ObjectStore;
use splitforge_av::{ChunkSplitter, Workspace};
use splitforge_common::{Result, SplitDefaults, SplitRequest, SplitResponse};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Processing stage of a split request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStage {
    Received,
    Resolving,
    Downloaded,
    Splitting,
    Split,
    Publishing,
    Completed,
}

impl fmt::Display for SplitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Resolving => "resolving",
            Self::Downloaded => "downloaded",
            Self::Splitting => "splitting",
            Self::Split => "split",
            Self::Publishing => "publishing",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Ties the source resolver, chunk splitter and publisher together.
#[derive(Clone)]
pub struct SplitService {
    resolver: SourceResolver,
    splitter: ChunkSplitter,
    store: Arc<dyn ObjectStore>,
    defaults: SplitDefaults,
    work_dir: Option<PathBuf>,
}

impl SplitService {
    pub fn new(
        resolver: SourceResolver,
        splitter: ChunkSplitter,
        store: Arc<dyn ObjectStore>,
        defaults: SplitDefaults,
    ) -> Self {
        Self {
            resolver,
            splitter,
            store,
            defaults,
            work_dir: None,
        }
    }

    /// Build the service from configuration around an existing store and splitter.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        splitter: ChunkSplitter,
    ) -> anyhow::Result<Self> {
        let resolver = SourceResolver::new(store.clone(), &config.fetch)?;
        let mut service = Self::new(resolver, splitter, store, config.split.defaults());
        service.work_dir = config.split.work_dir.clone();
        Ok(service)
    }

    pub fn splitter(&self) -> &ChunkSplitter {
        &self.splitter
    }

    /// Handle one `/split` request end to end.
    ///
    /// Either every chunk is produced and uploaded, or an error is returned.
    /// Resolver and publisher errors pass through unchanged; splitter errors
    /// carry the tool name as a prefix.
    pub async fn split(&self, request: &SplitRequest) -> Result<SplitResponse> {
        let job = request.resolve(&self.defaults)?;

        let span = tracing::info_span!(
            "split",
            request_id = %uuid::Uuid::new_v4(),
            transcription_id = %job.transcription_id,
        );

        async move {
            let started = Instant::now();
            let mut stage = SplitStage::Received;
            tracing::info!(
                bucket = %job.bucket,
                chunk_seconds = job.chunk_seconds,
                output_prefix = %job.output_prefix,
                "Split request received"
            );

            let result = self.run(&job, &mut stage).await;

            match &result {
                Ok(parts) => tracing::info!(
                    chunks = parts.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Split request completed"
                ),
                Err(e) => tracing::warn!(
                    stage = %stage,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Split request failed: {}",
                    e
                ),
            }

            result.map(|parts| SplitResponse {
                parts,
                bucket: job.bucket,
                chunk_seconds: job.chunk_seconds,
            })
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        job: &splitforge_common::ResolvedSplit,
        stage: &mut SplitStage,
    ) -> Result<Vec<String>> {
        let workspace = Workspace::create(self.work_dir.clone()).await?;

        let result = self.process(job, &workspace, stage).await;

        if let Err(e) = workspace.remove().await {
            tracing::warn!("Failed to remove workspace: {}", e);
        }

        result
    }

    async fn process(
        &self,
        job: &splitforge_common::ResolvedSplit,
        workspace: &Workspace,
        stage: &mut SplitStage,
    ) -> Result<Vec<String>> {
        advance(stage, SplitStage::Resolving);
        let source = self
            .resolver
            .resolve(&job.bucket, &job.storage_path)
            .await?;
        let input = workspace.write_input(&source).await?;
        tracing::debug!(bytes = source.len(), "Source written to {:?}", input);
        drop(source);
        advance(stage, SplitStage::Downloaded);

        advance(stage, SplitStage::Splitting);
        let chunks = self
            .splitter
            .split(&input, &workspace.chunks_dir(), job.chunk_seconds)
            .await?;
        advance(stage, SplitStage::Split);

        advance(stage, SplitStage::Publishing);
        let parts = publish(self.store.as_ref(), &job.bucket, &job.base_dir(), &chunks).await?;
        advance(stage, SplitStage::Completed);

        Ok(parts)
    }
}

fn advance(stage: &mut SplitStage, next: SplitStage) {
    tracing::trace!("{} -> {}", stage, next);
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display() {
        assert_eq!(SplitStage::Resolving.to_string(), "resolving");
        assert_eq!(SplitStage::Completed.to_string(), "completed");
    }
}
