//! # splitforge-av
//!
//! Audio segmenting on top of the ffmpeg CLI.
//!
//! This crate provides functionality for:
//! - Locating the ffmpeg executable (explicit override, `PATH`, or
//!   well-known install locations)
//! - Running external tools with captured output and a wall-clock timeout
//! - Per-request scratch workspaces that are removed on drop
//! - Re-encoding audio to a canonical mono AAC format and cutting it into
//!   fixed-duration, independently decodable chunks
//!
//! ## Example
//!
//! ```no_run
//! use splitforge_av::{locate_tool, ChunkSplitter, EncodingParams, Workspace, FFMPEG};
//!
//! # async fn example() -> splitforge_common::Result<()> {
//! let ffmpeg = locate_tool(FFMPEG, None)?;
//! let splitter = ChunkSplitter::new(Some(ffmpeg), EncodingParams::default());
//!
//! let workspace = Workspace::new()?;
//! let input = workspace.write_input(&std::fs::read("meeting.m4a")?).await?;
//! let chunks = splitter.split(&input, &workspace.chunks_dir(), 600).await?;
//! println!("{} chunks", chunks.len());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod segment;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{tail_chars, ProcessRunner, ToolCommand, ToolOutput, ToolRunner};
pub use segment::{
    collect_chunks, parse_chunk_index, segment_args, ChunkSplitter, EncodingParams,
    CHUNK_CONTENT_TYPE, CHUNK_EXTENSION, CHUNK_PREFIX,
};
pub use tools::{check_tool, locate_tool, ToolInfo, FFMPEG};
pub use workspace::Workspace;
