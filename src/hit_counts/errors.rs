//! # Hit Count Migration Errors

use thiserror::Error;

use crate::store::ArchiveError;

/// Result type for hit count migration
pub type HitCountResult<T> = Result<T, HitCountError>;

#[derive(Debug, Error)]
pub enum HitCountError {
    /// A legacy export row could not be read. Lines are 1-based.
    #[error("Malformed hit row at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Archive failure: {0}")]
    Archive(#[from] ArchiveError),
}

impl HitCountError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        HitCountError::Parse {
            line,
            message: message.into(),
        }
    }
}
