//! Splitforge - stateless audio chunking service
//!
//! This library crate exposes the service components for integration testing.

pub mod config;
pub mod publish;
pub mod server;
pub mod source;
pub mod split;
pub mod storage;
