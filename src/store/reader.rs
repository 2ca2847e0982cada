//! Archive log reader
//!
//! Every record is checksum-verified. A bad record is never skipped:
//! the archive is replayed completely or not at all.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::errors::{ArchiveError, ArchiveResult};
use super::record::{LogEntry, MIN_RECORD_SIZE};

/// Sequential reader over `archive.log`.
pub struct ArchiveLogReader {
    log_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl ArchiveLogReader {
    /// Opens the log file for reading.
    pub fn open(log_path: &Path) -> ArchiveResult<Self> {
        let file = File::open(log_path).map_err(|e| {
            ArchiveError::read_failed(
                format!("Failed to open archive log: {}", log_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| ArchiveError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            log_path: log_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` if a record was read
    /// - `Ok(None)` at end of file
    /// - `Err(CNX_ARCHIVE_DATA_CORRUPTION)` on any framing or checksum failure
    pub fn read_next(&mut self) -> ArchiveResult<Option<LogEntry>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(ArchiveError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated archive log: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            ArchiveError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(ArchiveError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(ArchiveError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            ArchiveError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (entry, consumed) = LogEntry::deserialize(&record_buf)
            .map_err(|e| ArchiveError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(entry))
    }

    /// Reads all remaining entries.
    pub fn read_all(&mut self) -> ArchiveResult<Vec<LogEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read_next()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
