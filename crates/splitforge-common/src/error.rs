//! Unified error type for splitforge.
//!
//! Every component (source resolution, splitting, publishing) reports its
//! failures through [`Error`]. The HTTP layer maps each variant to a status
//! code exactly once, via [`Error::http_status`].

use std::time::Duration;

/// Common error type for splitforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source object does not exist or access was denied.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request data failed validation at the boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external transcoding tool could not be located.
    #[error("Tool not found: {tool}")]
    ToolNotFound {
        /// Name of the missing tool.
        tool: String,
    },

    /// The external tool exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Processing {
        /// Name of the tool that failed.
        tool: String,
        /// Tail of the tool's diagnostic output.
        message: String,
    },

    /// The external tool exceeded its wall-clock limit.
    #[error("{tool} timed out after {}s", after.as_secs())]
    Timeout {
        /// Name of the tool that was killed.
        tool: String,
        /// The limit that was exceeded.
        after: Duration,
    },

    /// The external tool succeeded but produced no chunk files.
    #[error("No chunks produced: {0}")]
    NoOutput(String),

    /// Uploading a chunk to the storage backend failed.
    #[error("Failed to upload chunk {file} to {bucket}/{path}: {message}")]
    Upload {
        /// Local chunk file name.
        file: String,
        /// Destination bucket.
        bucket: String,
        /// Destination path within the bucket.
        path: String,
        /// Backend-reported reason.
        message: String,
    },

    /// A network or backend transport error.
    #[error("Transient I/O error: {0}")]
    Transient(String),

    /// A local I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Validation(_) => 400,
            Error::ToolNotFound { .. }
            | Error::Processing { .. }
            | Error::Timeout { .. }
            | Error::NoOutput(_)
            | Error::Upload { .. }
            | Error::Transient(_)
            | Error::Io { .. }
            | Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable name for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation_error",
            Error::ToolNotFound { .. } => "tool_not_found",
            Error::Processing { .. } => "processing_error",
            Error::Timeout { .. } => "timeout",
            Error::NoOutput(_) => "no_output",
            Error::Upload { .. } => "upload_error",
            Error::Transient(_) => "transient_io_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// The error message without its kind prefix, for embedding in another error.
    pub fn detail(&self) -> String {
        match self {
            Error::NotFound(msg)
            | Error::Validation(msg)
            | Error::NoOutput(msg)
            | Error::Transient(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::Io { source } => source.to_string(),
            _ => self.to_string(),
        }
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new ToolNotFound error.
    pub fn tool_not_found<S: Into<String>>(tool: S) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a new Processing error.
    pub fn processing(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processing {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new Transient error.
    pub fn transient<S: Into<String>>(msg: S) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("uploads/missing.m4a");
        assert_eq!(err.to_string(), "Not found: uploads/missing.m4a");

        let err = Error::processing("ffmpeg", "Invalid data found");
        assert_eq!(err.to_string(), "ffmpeg failed: Invalid data found");

        let err = Error::Timeout {
            tool: "ffmpeg".into(),
            after: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "ffmpeg timed out after 600s");

        let err = Error::Upload {
            file: "part_001.m4a".into(),
            bucket: "audio-files".into(),
            path: "audio-chunks/abc/part_001.m4a".into(),
            message: "HTTP 500".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to upload chunk part_001.m4a to audio-files/audio-chunks/abc/part_001.m4a: HTTP 500"
        );
    }

    #[test]
    fn test_detail_drops_kind_prefix() {
        assert_eq!(Error::internal("HTTP 500: boom").detail(), "HTTP 500: boom");
        assert_eq!(Error::transient("connection reset").detail(), "connection reset");

        let io = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "Not a directory"));
        assert_eq!(io.detail(), "Not a directory");

        let err = Error::processing("ffmpeg", "bad input");
        assert_eq!(err.detail(), "ffmpeg failed: bad input");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::not_found("x").http_status(), 404);
        assert_eq!(Error::validation("x").http_status(), 400);
        assert_eq!(Error::tool_not_found("ffmpeg").http_status(), 500);
        assert_eq!(Error::processing("ffmpeg", "x").http_status(), 500);
        assert_eq!(Error::NoOutput("x".into()).http_status(), 500);
        assert_eq!(Error::transient("x").http_status(), 500);
        assert_eq!(Error::internal("x").http_status(), 500);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.code(), "io_error");
    }
}
