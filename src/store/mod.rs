//! Archive store
//!
//! The upgrade steps never talk to storage directly. They consume the
//! collaborator traits below, which `Archive` implements both for the
//! on-disk archive and for in-memory fixtures in tests.
//!
//! # Persistence
//!
//! - `<archive_dir>/data/archive.log` is an append-only record file
//! - Every record is checksum-verified on replay; corruption is fatal
//! - Only committed changes reach the log
//!
//! # Transactions
//!
//! Single level. Changes made inside a transaction are visible to the
//! caller immediately and are either appended to the log together on
//! `commit` or undone together on `rollback`. Changes made outside a
//! transaction commit on their own.

mod archive;
mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

use chrono::{DateTime, Utc};

use crate::archive::{
    HitRange, IdMap, LineageId, NextRevision, PortalType, RevisionId, RevisionStamp,
};

pub use archive::{Archive, ArchiveFixture, ImportSummary};
pub use checksum::compute_checksum;
pub use errors::{ArchiveError, ArchiveErrorCode, ArchiveResult, Severity};
pub use reader::ArchiveLogReader;
pub use record::LogEntry;
pub use writer::{log_path, ArchiveLogWriter, LOG_FILE_NAME};

/// One non-root node of a collection tree, resolved to its document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub revision: RevisionId,
    pub lineage: LineageId,
    pub portal_type: PortalType,
    pub revised: DateTime<Utc>,
}

/// Unit-of-work boundaries.
pub trait Transactional {
    fn begin(&mut self) -> ArchiveResult<()>;
    fn commit(&mut self) -> ArchiveResult<()>;
    fn rollback(&mut self) -> ArchiveResult<()>;
}

/// Document/version store, revision query and tree rebuilder used by
/// the collection minor version upgrade.
pub trait ArchiveStore: Transactional {
    /// The collection revision and the revision that follows it in its
    /// lineage, or a synthetic follower stamped "now" with minor 1.
    fn current_and_next_revision(
        &self,
        collection: RevisionId,
    ) -> ArchiveResult<(RevisionStamp, NextRevision)>;

    /// Minor version of a collection revision; `None` if the revision is
    /// not a collection.
    fn minor_version(&self, revision: RevisionId) -> ArchiveResult<Option<u32>>;

    /// Non-root nodes of the collection's tree in preorder.
    fn walk_tree(&self, collection: RevisionId) -> ArchiveResult<Vec<TreeEntry>>;

    /// Revisions of `lineage` strictly inside `(after, before)`, other
    /// than `exclude`, ordered by revised time.
    fn revisions_in_window(
        &self,
        lineage: LineageId,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
        exclude: RevisionId,
    ) -> ArchiveResult<Vec<RevisionStamp>>;

    /// One past the highest minor version published for the collection's
    /// lineage and major version.
    fn next_minor_version(&self, collection: RevisionId) -> ArchiveResult<u32>;

    /// Creates a new revision of `base` at `minor_version`, stamped
    /// `revised`.
    fn republish_collection(
        &mut self,
        minor_version: u32,
        base: RevisionId,
        revised: DateTime<Utc>,
    ) -> ArchiveResult<RevisionId>;

    /// Copies the tree of `original` onto the revision `id_map[original]`,
    /// substituting every document reference found in `id_map`.
    fn rebuild_tree(&mut self, original: RevisionId, id_map: &IdMap) -> ArchiveResult<()>;
}

/// Store used by the hit count migration.
pub trait HitCountStore: Transactional {
    /// Latest revision published under a legacy id.
    fn latest_revision_for(&self, legacy_id: &str) -> ArchiveResult<Option<RevisionId>>;

    fn insert_hit_range(&mut self, range: HitRange) -> ArchiveResult<()>;
}
