//! Error types for timeflow-core

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for scoring operations.
///
/// Every variant is recoverable by the caller; nothing in this crate aborts
/// the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Input rejected before reaching the scoring core
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Achievement id not present in the catalog
    #[error("Achievement not found: {0}")]
    AchievementNotFound(String),

    /// Snapshot was modified since it was read
    #[error("Stale snapshot: expected revision {expected}, found {actual}")]
    StaleSnapshot { expected: u64, actual: u64 },

    /// `updated_at` precedes `created_at` in a persisted snapshot
    #[error("timestamps must be monotonic: updated_at ({updated_at}) < created_at ({created_at})")]
    NonMonotonicTimestamps {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },

    /// Scoring configuration could not be read or failed validation
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for timeflow-core operations
pub type Result<T> = std::result::Result<T, Error>;
