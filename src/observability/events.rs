//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events of an upgrade run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Archive
    /// Archive log replayed and ready
    ArchiveOpened,
    /// Transaction entries appended and fsynced
    ArchiveCommit,
    /// Transaction entries discarded
    ArchiveRollback,
    /// Archive log failed verification (FATAL)
    ArchiveCorruption,
    /// Fixture loaded into the archive
    ImportComplete,

    // Minor versions
    ReconstructBegin,
    MinorVersionCreated,
    /// Collection needs no work
    ReconstructSkipped,
    ReconstructComplete,
    ReconstructFailed,

    // Hit counts
    HitCountsMigrated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ArchiveOpened => "ARCHIVE_OPENED",
            Event::ArchiveCommit => "ARCHIVE_COMMIT",
            Event::ArchiveRollback => "ARCHIVE_ROLLBACK",
            Event::ArchiveCorruption => "ARCHIVE_CORRUPTION",
            Event::ImportComplete => "IMPORT_COMPLETE",

            Event::ReconstructBegin => "RECONSTRUCT_BEGIN",
            Event::MinorVersionCreated => "MINOR_VERSION_CREATED",
            Event::ReconstructSkipped => "RECONSTRUCT_SKIPPED",
            Event::ReconstructComplete => "RECONSTRUCT_COMPLETE",
            Event::ReconstructFailed => "RECONSTRUCT_FAILED",

            Event::HitCountsMigrated => "HIT_COUNTS_MIGRATED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ArchiveCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
