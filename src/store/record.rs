//! Archive log record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Entry Kind       | (u8: 1 = document, 2 = tree node, 3 = hit range)
//! +------------------+
//! | Entry Body       | (JSON)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io;

use serde::{Deserialize, Serialize};

use super::checksum::compute_checksum;
use crate::archive::{Document, HitRange, TreeNode};

/// Length + kind + checksum
pub const MIN_RECORD_SIZE: usize = 4 + 1 + 4;

/// One persisted archive change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntry {
    Document(Document),
    TreeNode(TreeNode),
    HitRange(HitRange),
}

impl LogEntry {
    fn kind(&self) -> u8 {
        match self {
            LogEntry::Document(_) => 1,
            LogEntry::TreeNode(_) => 2,
            LogEntry::HitRange(_) => 3,
        }
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let body = serde_json::to_vec(self)?;
        let record_length = (MIN_RECORD_SIZE + body.len()) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.push(self.kind());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        Ok(record)
    }

    /// Deserialize a record from bytes, verifying checksum and kind.
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[0..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let kind = data[4];
        let entry: LogEntry = serde_json::from_slice(&data[5..checksum_offset])?;

        if entry.kind() != kind {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Entry kind {} does not match body kind {}", kind, entry.kind()),
            ));
        }

        Ok((entry, record_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{LineageId, PortalType, RevisionId, Version};
    use chrono::{TimeZone, Utc};

    fn sample_entry() -> LogEntry {
        LogEntry::Document(Document {
            revision: RevisionId::new(1),
            lineage: LineageId::generate(),
            legacy_id: "m1".to_string(),
            name: "Name of module m1".to_string(),
            portal_type: PortalType::Module,
            version: Version::major(1),
            revised: Utc.with_ymd_and_hms(2013, 10, 1, 18, 24, 0).unwrap(),
        })
    }

    #[test]
    fn test_record_roundtrip() {
        let entry = sample_entry();
        let serialized = entry.serialize().unwrap();
        let (decoded, consumed) = LogEntry::deserialize(&serialized).unwrap();

        assert_eq!(decoded, entry);
        assert_eq!(consumed, serialized.len());
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut serialized = sample_entry().serialize().unwrap();
        let mid = serialized.len() / 2;
        serialized[mid] ^= 0xFF;

        let result = LogEntry::deserialize(&serialized);
        assert!(result.unwrap_err().to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let serialized = sample_entry().serialize().unwrap();
        let result = LogEntry::deserialize(&serialized[..serialized.len() - 3]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_kind_byte_matches_body() {
        let serialized = sample_entry().serialize().unwrap();
        assert_eq!(serialized[4], 1);
    }
}
