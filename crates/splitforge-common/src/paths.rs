//! Storage path helpers.
//!
//! Remote chunk locations are built as `{outputPrefix}/{transcriptionId}/{file}`.
//! The helpers here normalize the caller-supplied pieces and refuse segments
//! that would escape the prefix (`.`, `..`, or empty segments).

use crate::{Error, Result};

/// Returns true when the reference is an absolute `http://` or `https://` URL.
///
/// # Examples
///
/// ```
/// use splitforge_common::paths::is_http_url;
///
/// assert!(is_http_url("https://example.com/a.m4a?token=x"));
/// assert!(is_http_url("  HTTP://example.com/a.m4a"));
/// assert!(!is_http_url("uploads/meeting.m4a"));
/// ```
pub fn is_http_url(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strip surrounding whitespace and any leading `/` from a storage-relative path.
///
/// # Examples
///
/// ```
/// use splitforge_common::paths::normalize_storage_path;
///
/// assert_eq!(normalize_storage_path("//uploads/meeting.m4a "), "uploads/meeting.m4a");
/// ```
pub fn normalize_storage_path(path: &str) -> &str {
    path.trim().trim_start_matches('/')
}

/// Strip surrounding whitespace and slashes from a path component.
pub fn trim_component(value: &str) -> &str {
    value.trim().trim_matches('/')
}

/// Validate a trimmed path component.
///
/// `allow_nested` permits interior `/` separators (used for output prefixes).
/// Empty, `.` and `..` segments are always rejected.
pub fn check_component(label: &str, value: &str, allow_nested: bool) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!("{label} cannot be empty")));
    }
    if !allow_nested && value.contains('/') {
        return Err(Error::validation(format!(
            "{label} must be a single path segment: {value}"
        )));
    }
    for segment in value.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(Error::validation(format!(
                "{label} contains an invalid path segment: {value}"
            )));
        }
    }
    Ok(())
}

/// Directory under which one transcription's chunks are stored.
pub fn chunk_base_dir(output_prefix: &str, transcription_id: &str) -> String {
    format!("{output_prefix}/{transcription_id}")
}

/// Remote path for a single chunk file.
pub fn remote_chunk_path(base_dir: &str, file_name: &str) -> String {
    format!("{base_dir}/{file_name}")
}
