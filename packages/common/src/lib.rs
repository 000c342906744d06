//! Common infrastructure shared by the certutil crates
//!
//! This crate provides:
//! - Structured logging bootstrap on top of `env_logger`
//! - Filesystem helpers for writing issuance artifacts atomically

pub mod fs_ops;
pub mod logging;

pub use fs_ops::{ArtifactMode, write_artifact};
pub use logging::LoggingTransformer;
