//! Re-encode and cut audio into fixed-duration chunks with ffmpeg's segment muxer.
//!
//! Every chunk is re-encoded to the same canonical format (channel count,
//! sample rate, codec, constant bitrate) and timestamps restart at zero in
//! each file, so any chunk can be decoded on its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use splitforge_common::{Error, Result};

use crate::command::{ProcessRunner, ToolCommand, ToolRunner, DEFAULT_TIMEOUT};
use crate::tools::FFMPEG;

/// File name prefix of produced chunks.
pub const CHUNK_PREFIX: &str = "part_";

/// Container extension of produced chunks.
pub const CHUNK_EXTENSION: &str = "m4a";

/// MIME type of the chunk container.
pub const CHUNK_CONTENT_TYPE: &str = "audio/mp4";

/// Output pattern handed to the segment muxer (`part_000.m4a`, `part_001.m4a`, ...).
const CHUNK_PATTERN: &str = "part_%03d.m4a";

/// Canonical encoding applied to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    pub channels: u32,
    pub sample_rate: u32,
    /// ffmpeg encoder name.
    pub codec: String,
    /// Constant bitrate in ffmpeg notation (`64k`).
    pub bitrate: String,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 16_000,
            codec: "aac".to_string(),
            bitrate: "64k".to_string(),
        }
    }
}

/// Build the ffmpeg argument list for one split.
///
/// The shape is fixed; only the values come from the arguments.
pub fn segment_args(
    input: &Path,
    output_dir: &Path,
    chunk_seconds: u64,
    params: &EncodingParams,
) -> Vec<String> {
    let pattern = output_dir.join(CHUNK_PATTERN);
    vec![
        "-nostdin".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-vn".to_string(),
        "-ac".to_string(),
        params.channels.to_string(),
        "-ar".to_string(),
        params.sample_rate.to_string(),
        "-c:a".to_string(),
        params.codec.clone(),
        "-b:a".to_string(),
        params.bitrate.clone(),
        "-f".to_string(),
        "segment".to_string(),
        "-segment_time".to_string(),
        chunk_seconds.to_string(),
        "-reset_timestamps".to_string(),
        "1".to_string(),
        pattern.to_string_lossy().to_string(),
    ]
}

/// Parse the numeric index out of a chunk file name (`part_007.m4a` -> 7).
pub fn parse_chunk_index(file_name: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(CHUNK_PREFIX)?
        .strip_suffix(CHUNK_EXTENSION)?
        .strip_suffix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// List chunk files in `dir`, ordered by chunk index.
///
/// Files that do not follow the chunk naming scheme are ignored.
pub async fn collect_chunks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut chunks = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(parse_chunk_index) else {
            continue;
        };
        chunks.push((index, entry.path()));
    }

    chunks.sort();
    Ok(chunks.into_iter().map(|(_, path)| path).collect())
}

/// Remove chunk files left in `dir` by an earlier run, so the listing after
/// a split holds only what that run produced.
async fn clear_chunks(dir: &Path) -> Result<()> {
    let stale = collect_chunks(dir)
        .await
        .map_err(|e| Error::processing(FFMPEG, format!("reading chunks: {}", e.detail())))?;
    if !stale.is_empty() {
        tracing::debug!("Removing {} stale chunks from {:?}", stale.len(), dir);
    }
    for path in stale {
        tokio::fs::remove_file(&path).await.map_err(|e| {
            Error::processing(FFMPEG, format!("removing stale chunk {:?}: {e}", path))
        })?;
    }
    Ok(())
}

/// Splits a local audio file into canonical chunks.
#[derive(Clone)]
pub struct ChunkSplitter {
    program: Option<PathBuf>,
    params: EncodingParams,
    timeout: Duration,
    runner: Arc<dyn ToolRunner>,
}

impl std::fmt::Debug for ChunkSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSplitter")
            .field("program", &self.program)
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChunkSplitter {
    /// Create a splitter that runs ffmpeg as a subprocess.
    ///
    /// `program` is the resolved ffmpeg path; `None` means discovery failed
    /// and every split reports [`Error::ToolNotFound`].
    pub fn new(program: Option<PathBuf>, params: EncodingParams) -> Self {
        Self {
            program,
            params,
            timeout: DEFAULT_TIMEOUT,
            runner: Arc::new(ProcessRunner),
        }
    }

    /// Set the wall-clock limit for one ffmpeg run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the subprocess runner.
    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    pub fn params(&self) -> &EncodingParams {
        &self.params
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Prepare the ffmpeg invocation without running it.
    pub fn command(&self, input: &Path, output_dir: &Path, chunk_seconds: u64) -> Result<ToolCommand> {
        let program = self
            .program
            .clone()
            .ok_or_else(|| Error::tool_not_found(FFMPEG))?;

        let mut cmd = ToolCommand::new(program);
        cmd.timeout(self.timeout);
        cmd.args(segment_args(input, output_dir, chunk_seconds, &self.params));
        Ok(cmd)
    }

    /// Re-encode `input` and cut it into `chunk_seconds`-long files in
    /// `output_dir`, returning the chunk paths in chunk order.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `chunk_seconds` is zero.
    /// - [`Error::ToolNotFound`] if ffmpeg was not resolved.
    /// - [`Error::Processing`] / [`Error::Timeout`] from the ffmpeg run.
    /// - [`Error::NoOutput`] if ffmpeg succeeded without writing a chunk.
    pub async fn split(
        &self,
        input: &Path,
        output_dir: &Path,
        chunk_seconds: u64,
    ) -> Result<Vec<PathBuf>> {
        if chunk_seconds == 0 {
            return Err(Error::validation("chunk duration must be positive"));
        }

        let cmd = self.command(input, output_dir, chunk_seconds)?;
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            Error::processing(FFMPEG, format!("preparing output directory {:?}: {e}", output_dir))
        })?;
        clear_chunks(output_dir).await?;

        tracing::info!(
            "Splitting {:?} into {}s chunks ({} {}ch {}Hz {})",
            input,
            chunk_seconds,
            self.params.codec,
            self.params.channels,
            self.params.sample_rate,
            self.params.bitrate
        );

        let start = Instant::now();
        self.runner.run(&cmd).await?;

        let chunks = collect_chunks(output_dir)
            .await
            .map_err(|e| Error::processing(FFMPEG, format!("reading chunks: {}", e.detail())))?;
        if chunks.is_empty() {
            return Err(Error::NoOutput(
                "check input format or ffmpeg install".to_string(),
            ));
        }

        tracing::debug!(
            chunks = chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "split complete"
        );

        Ok(chunks)
    }
}
