//! External tool detection.
//!
//! A tool is resolved from, in order: an explicitly configured path, the
//! `PATH` search, and a short list of well-known install directories.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use splitforge_common::{Error, Result};

/// Name of the transcoding executable.
pub const FFMPEG: &str = "ffmpeg";

/// Install directories checked when a tool is not on `PATH`.
const WELL_KNOWN_DIRS: &[&str] = &[
    "/usr/bin",
    "/usr/local/bin",
    "/opt/homebrew/bin",
    "/opt/local/bin",
    "/snap/bin",
];

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Locate a tool, preferring a configured path over `PATH` lookup.
///
/// A configured path that is not an executable file is logged and skipped.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if no candidate resolves to an executable.
pub fn locate_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    let dirs: Vec<PathBuf> = WELL_KNOWN_DIRS.iter().map(PathBuf::from).collect();
    locate_tool_in(name, configured, &dirs)
}

/// Same as [`locate_tool`] with an explicit list of fallback directories.
pub fn locate_tool_in(
    name: &str,
    configured: Option<&Path>,
    fallback_dirs: &[PathBuf],
) -> Result<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured {} path {:?} is not an executable file; searching PATH",
            name,
            path
        );
    }

    if let Ok(path) = which::which(name) {
        return Ok(path);
    }

    fallback_dirs
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| Error::tool_not_found(name))
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use splitforge_av::{check_tool, FFMPEG};
///
/// let info = check_tool(FFMPEG, None);
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, configured: Option<&Path>) -> ToolInfo {
    match locate_tool(name, configured) {
        Ok(path) => ToolInfo {
            name: name.to_string(),
            available: true,
            version: detect_version(name, &path),
            path: Some(path),
        },
        Err(_) => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Run `<tool> -version` (or `--version`) and return the first line of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };

    let output = Command::new(path).arg(version_arg).output().ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
