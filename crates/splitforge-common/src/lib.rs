//! Splitforge-Common: Shared types, errors, and path utilities.
//!
//! This crate provides the pieces shared by the splitter library and the
//! HTTP service:
//!
//! - **Error Handling**: one error type whose variants map onto HTTP status
//!   codes at the service boundary
//! - **Request Schema**: the `/split` request and response bodies, with
//!   defaulting and validation
//! - **Path Utilities**: storage path normalization and remote path joining
//!
//! # Examples
//!
//! ```
//! use splitforge_common::paths::remote_chunk_path;
//! use splitforge_common::{Error, Result};
//!
//! assert_eq!(
//!     remote_chunk_path("audio-chunks/abc123", "part_000.m4a"),
//!     "audio-chunks/abc123/part_000.m4a"
//! );
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("object missing"))
//! }
//! assert_eq!(example().unwrap_err().http_status(), 404);
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
