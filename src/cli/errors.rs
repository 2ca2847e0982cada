//! CLI-specific error types
//!
//! Every CLI error ends the process with exit status 1.

use std::fmt;
use std::io;

use crate::hit_counts::HitCountError;
use crate::minor_versions::ReconstructError;
use crate::store::ArchiveError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    AlreadyInitialized,
    NotInitialized,
    /// Archive rejected an operation or failed verification
    ArchiveFailed,
    /// Minor version reconstruction failed
    ReconstructFailed,
    /// Input file could not be used
    InvalidInput,
    NotFound,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CNX_CLI_CONFIG_ERROR",
            Self::IoError => "CNX_CLI_IO_ERROR",
            Self::AlreadyInitialized => "CNX_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "CNX_CLI_NOT_INITIALIZED",
            Self::ArchiveFailed => "CNX_CLI_ARCHIVE_FAILED",
            Self::ReconstructFailed => "CNX_CLI_RECONSTRUCT_FAILED",
            Self::InvalidInput => "CNX_CLI_INVALID_INPUT",
            Self::NotFound => "CNX_CLI_NOT_FOUND",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Archive directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Archive directory not initialized. Run 'cnx-upgrade init' first.",
        )
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NotFound, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ArchiveError> for CliError {
    fn from(e: ArchiveError) -> Self {
        Self::new(CliErrorCode::ArchiveFailed, e.to_string())
    }
}

impl From<ReconstructError> for CliError {
    fn from(e: ReconstructError) -> Self {
        Self::new(CliErrorCode::ReconstructFailed, e.to_string())
    }
}

impl From<HitCountError> for CliError {
    fn from(e: HitCountError) -> Self {
        match e {
            HitCountError::Parse { .. } => Self::invalid_input(e.to_string()),
            HitCountError::Archive(inner) => inner.into(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
