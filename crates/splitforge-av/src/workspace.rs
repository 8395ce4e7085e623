//! Per-request scratch workspace.
//!
//! A [`Workspace`] owns a temporary directory holding one input file and one
//! `chunks/` output directory. The directory is removed recursively when the
//! workspace is dropped, so every exit path of a request (success, error,
//! panic, or a cancelled future) releases it.

use std::path::{Path, PathBuf};

use splitforge_common::{Error, Result};
use tempfile::TempDir;

/// File name of the downloaded source inside the workspace.
pub const INPUT_FILE_NAME: &str = "input";

/// Directory receiving the produced chunks.
pub const CHUNKS_DIR_NAME: &str = "chunks";

/// Temporary directory scoped to a single split request.
///
/// # Example
///
/// ```no_run
/// use splitforge_av::Workspace;
///
/// # async fn example() -> splitforge_common::Result<()> {
/// let workspace = Workspace::new()?;
/// let input = workspace.write_input(b"...").await?;
/// assert!(input.starts_with(workspace.root()));
/// // Dropping (or closing) the workspace removes everything.
/// workspace.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        Self::build(tempfile::Builder::new().prefix("splitforge-").tempdir())
    }

    /// Create a workspace under `parent`.
    pub fn new_in(parent: &Path) -> Result<Self> {
        Self::build(tempfile::Builder::new().prefix("splitforge-").tempdir_in(parent))
    }

    fn build(temp_dir: std::io::Result<TempDir>) -> Result<Self> {
        let temp_dir =
            temp_dir.map_err(|e| Error::internal(format!("failed to create workspace: {e}")))?;
        std::fs::create_dir_all(temp_dir.path().join(CHUNKS_DIR_NAME))?;
        Ok(Self { temp_dir })
    }

    /// Create a workspace on the blocking pool, under `parent` or the system
    /// temp directory.
    pub async fn create(parent: Option<PathBuf>) -> Result<Self> {
        tokio::task::spawn_blocking(move || match parent {
            Some(dir) => Self::new_in(&dir),
            None => Self::new(),
        })
        .await
        .map_err(|e| Error::internal(format!("workspace task failed: {e}")))?
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_path(&self) -> PathBuf {
        self.temp_dir.path().join(INPUT_FILE_NAME)
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.temp_dir.path().join(CHUNKS_DIR_NAME)
    }

    /// Write the source bytes to the fixed input file, returning its path.
    pub async fn write_input(&self, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.input_path();
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Remove the workspace now, reporting any removal error.
    pub fn close(self) -> Result<()> {
        self.temp_dir.close().map_err(Error::from)
    }

    /// [`close`](Self::close) on the blocking pool.
    ///
    /// A workspace dropped without this (a cancelled request) is still
    /// removed, synchronously, by `Drop`.
    pub async fn remove(self) -> Result<()> {
        tokio::task::spawn_blocking(move || self.close())
            .await
            .map_err(|e| Error::internal(format!("workspace task failed: {e}")))?
    }
}
