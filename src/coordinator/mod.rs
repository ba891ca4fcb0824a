//! # Embedded coordination backend.
//!
//! - [`EmbeddedCoordinator`]: local single-node backend bound to a data directory
//! - [`CoordinatorComponent`]: runs it under the supervisor like any component
//! - [`Store`]: the key-value/lock state it serves

mod embedded;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use embedded::{COORDINATOR_NAME, CoordinatorComponent, EmbeddedCoordinator};
pub use store::{KeyValue, LOCK_PREFIX, Store};

/// Errors raised while starting or closing the embedded coordinator.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("failed to create data dir '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read snapshot '{path}': {source}")]
    ReadSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot '{path}': {source}")]
    DecodeSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot '{path}': {source}")]
    EncodeSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write snapshot '{path}': {source}")]
    WriteSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoordinatorError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CoordinatorError::CreateDir { .. } => "coordinator_create_dir",
            CoordinatorError::ReadSnapshot { .. } => "coordinator_read_snapshot",
            CoordinatorError::DecodeSnapshot { .. } => "coordinator_decode_snapshot",
            CoordinatorError::EncodeSnapshot { .. } => "coordinator_encode_snapshot",
            CoordinatorError::WriteSnapshot { .. } => "coordinator_write_snapshot",
        }
    }
}
