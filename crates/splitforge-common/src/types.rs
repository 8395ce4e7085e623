//! Request and response bodies for the `/split` endpoint.
//!
//! Field names are camelCase on the wire. Optional request fields fall back
//! to [`SplitDefaults`] when absent or blank; [`SplitRequest::resolve`]
//! performs that merge and the boundary validation in one step.

use serde::{Deserialize, Serialize};

use crate::paths::{check_component, chunk_base_dir, trim_component};
use crate::{Error, Result};

/// Body of `POST /split`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    /// Opaque identifier, used as a path segment for the output chunks.
    pub transcription_id: String,
    /// Storage-relative path or absolute http(s) URL of the source audio.
    pub storage_path: String,
    #[serde(default)]
    pub bucket: Option<String>,
    /// Signed so that negative values reach validation instead of failing
    /// deserialization with an opaque message.
    #[serde(default)]
    pub chunk_seconds: Option<i64>,
    #[serde(default)]
    pub output_prefix: Option<String>,
}

/// Body of a successful `POST /split` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    /// Remote chunk paths in chunk order.
    pub parts: Vec<String>,
    /// Bucket the chunks were written to.
    pub bucket: String,
    /// Segment duration actually used.
    pub chunk_seconds: u64,
}

/// Process-wide defaults applied to requests that omit optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDefaults {
    pub bucket: String,
    pub chunk_seconds: u64,
    pub output_prefix: String,
}

impl Default for SplitDefaults {
    fn default() -> Self {
        Self {
            bucket: "audio-files".to_string(),
            chunk_seconds: 600,
            output_prefix: "audio-chunks".to_string(),
        }
    }
}

/// A request after defaulting and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSplit {
    pub transcription_id: String,
    pub storage_path: String,
    pub bucket: String,
    pub chunk_seconds: u64,
    pub output_prefix: String,
}

impl ResolvedSplit {
    /// Remote directory holding this request's chunks.
    pub fn base_dir(&self) -> String {
        chunk_base_dir(&self.output_prefix, &self.transcription_id)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SplitRequest {
    /// Merge the request with `defaults` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a required field is blank, when
    /// `chunkSeconds` is not positive, or when the transcription id or output
    /// prefix contain `.`/`..`/empty path segments.
    pub fn resolve(&self, defaults: &SplitDefaults) -> Result<ResolvedSplit> {
        let transcription_id = trim_component(&self.transcription_id);
        check_component("transcriptionId", transcription_id, false)?;

        let storage_path = self.storage_path.trim();
        if storage_path.is_empty() {
            return Err(Error::validation("storagePath cannot be empty"));
        }

        let bucket = non_blank(self.bucket.as_deref()).unwrap_or(&defaults.bucket);

        let chunk_seconds = match self.chunk_seconds {
            None => defaults.chunk_seconds,
            Some(secs) if secs > 0 => secs as u64,
            Some(secs) => {
                return Err(Error::validation(format!(
                    "chunkSeconds must be a positive integer, got {secs}"
                )))
            }
        };

        let output_prefix = trim_component(
            non_blank(self.output_prefix.as_deref()).unwrap_or(&defaults.output_prefix),
        );
        check_component("outputPrefix", output_prefix, true)?;

        Ok(ResolvedSplit {
            transcription_id: transcription_id.to_string(),
            storage_path: storage_path.to_string(),
            bucket: bucket.to_string(),
            chunk_seconds,
            output_prefix: output_prefix.to_string(),
        })
    }
}
