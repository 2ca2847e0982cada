//! Archive error types
//!
//! Error codes:
//! - CNX_ARCHIVE_IO_ERROR (ERROR severity)
//! - CNX_ARCHIVE_WRITE_FAILED (ERROR severity)
//! - CNX_ARCHIVE_READ_FAILED (ERROR severity)
//! - CNX_ARCHIVE_LOOKUP_FAILED (ERROR severity)
//! - CNX_ARCHIVE_TRANSACTION (ERROR severity)
//! - CNX_ARCHIVE_INVALID_INPUT (ERROR severity)
//! - CNX_ARCHIVE_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

use crate::archive::RevisionId;

/// Severity levels for archive errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the run may continue with the next unit of work
    Error,
    /// The archive cannot be trusted; the run must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Archive error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveErrorCode {
    /// Disk I/O failure
    CnxArchiveIoError,
    /// Appending to the archive log failed
    CnxArchiveWriteFailed,
    /// Reading the archive log failed
    CnxArchiveReadFailed,
    /// A referenced document, version or tree does not exist
    CnxArchiveLookupFailed,
    /// Transaction misuse (nested begin, commit without begin)
    CnxArchiveTransaction,
    /// Request rejected by an archive constraint
    CnxArchiveInvalidInput,
    /// Checksum or framing failure in the archive log
    CnxArchiveDataCorruption,
}

impl ArchiveErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ArchiveErrorCode::CnxArchiveIoError => "CNX_ARCHIVE_IO_ERROR",
            ArchiveErrorCode::CnxArchiveWriteFailed => "CNX_ARCHIVE_WRITE_FAILED",
            ArchiveErrorCode::CnxArchiveReadFailed => "CNX_ARCHIVE_READ_FAILED",
            ArchiveErrorCode::CnxArchiveLookupFailed => "CNX_ARCHIVE_LOOKUP_FAILED",
            ArchiveErrorCode::CnxArchiveTransaction => "CNX_ARCHIVE_TRANSACTION",
            ArchiveErrorCode::CnxArchiveInvalidInput => "CNX_ARCHIVE_INVALID_INPUT",
            ArchiveErrorCode::CnxArchiveDataCorruption => "CNX_ARCHIVE_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ArchiveErrorCode::CnxArchiveDataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ArchiveErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Archive error with context
#[derive(Debug)]
pub struct ArchiveError {
    code: ArchiveErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl ArchiveError {
    fn new(code: ArchiveErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new archive I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(ArchiveErrorCode::CnxArchiveIoError, message)
        }
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(ArchiveErrorCode::CnxArchiveWriteFailed, message)
        }
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(ArchiveErrorCode::CnxArchiveReadFailed, message)
        }
    }

    /// A document revision referenced by the caller or by a tree is missing
    pub fn missing_revision(revision: RevisionId) -> Self {
        Self {
            details: Some(format!("revision: {}", revision)),
            ..Self::new(
                ArchiveErrorCode::CnxArchiveLookupFailed,
                "Document revision not found",
            )
        }
    }

    /// Generic lookup failure
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self::new(ArchiveErrorCode::CnxArchiveLookupFailed, message)
    }

    /// Transaction state violation
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ArchiveErrorCode::CnxArchiveTransaction, message)
    }

    /// Constraint violation
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ArchiveErrorCode::CnxArchiveInvalidInput, message)
    }

    /// Create a new data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(ArchiveErrorCode::CnxArchiveDataCorruption, message)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::data_corruption(reason)
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ArchiveErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether this error reports missing data
    pub fn is_lookup(&self) -> bool {
        self.code == ArchiveErrorCode::CnxArchiveLookupFailed
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
