//! Archive log writer
//!
//! Append-only. A batch of entries is written and fsynced as one unit;
//! the caller only treats a commit as durable once `append` returns.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{ArchiveError, ArchiveResult};
use super::record::LogEntry;

/// Name of the log file inside `<archive_dir>/data/`.
pub const LOG_FILE_NAME: &str = "archive.log";

/// Returns the log path for an archive directory.
pub fn log_path(archive_dir: &Path) -> PathBuf {
    archive_dir.join("data").join(LOG_FILE_NAME)
}

/// Appends committed entries to `archive.log`.
pub struct ArchiveLogWriter {
    log_path: PathBuf,
    file: File,
    current_offset: u64,
}

impl ArchiveLogWriter {
    /// Opens or creates `<archive_dir>/data/archive.log`.
    ///
    /// # Errors
    ///
    /// Returns `CNX_ARCHIVE_WRITE_FAILED` if the directory or file cannot
    /// be created or opened.
    pub fn open(archive_dir: &Path) -> ArchiveResult<Self> {
        let data_subdir = archive_dir.join("data");
        let log_path = data_subdir.join(LOG_FILE_NAME);

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                ArchiveError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                ArchiveError::write_failed(
                    format!("Failed to open archive log: {}", log_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| ArchiveError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            log_path,
            file,
            current_offset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends entries and fsyncs.
    ///
    /// # Returns
    ///
    /// The number of bytes appended.
    pub fn append(&mut self, entries: &[LogEntry]) -> ArchiveResult<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::new();
        for entry in entries {
            let record = entry.serialize().map_err(|e| {
                ArchiveError::write_failed("Failed to encode archive log record", e)
            })?;
            buf.extend_from_slice(&record);
        }

        self.file.write_all(&buf).map_err(|e| {
            ArchiveError::write_failed(
                format!("Failed to append {} archive log records", entries.len()),
                e,
            )
        })?;

        self.file
            .sync_all()
            .map_err(|e| ArchiveError::write_failed("fsync failed after archive log append", e))?;

        self.current_offset += buf.len() as u64;
        Ok(buf.len() as u64)
    }
}
