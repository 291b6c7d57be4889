//! Error types for splitlog.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from storage engine operations.
///
/// Conflicts and not-found are distinct kinds: a conflict is a
/// business-logic rejection the caller must not retry, while not-found
/// means the caller asked about a test that was never registered.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage directory missing at construction. Fatal, no retry.
    #[error("storage directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    /// A test is already registered with a different alternatives list.
    #[error("test \"{name}\" already exists with different alternatives")]
    TestConflict {
        /// Name of the conflicting test.
        name: String,
    },

    /// An identity already has a different alternative for this test.
    #[error("different alternative already set for identity \"{identity}\" in test \"{test_name}\"")]
    AssignmentConflict {
        /// Identity that was already assigned.
        identity: String,
        /// Test the assignment belongs to.
        test_name: String,
    },

    /// Report requested for a test that was never registered.
    #[error("unknown test \"{0}\"")]
    UnknownTest(String),

    /// I/O error from lock or append operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failure. Programmer error, never retried.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error is a business-logic conflict (as opposed to a
    /// transient or environmental fault).
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::TestConflict { .. } | Self::AssignmentConflict { .. }
        )
    }
}
