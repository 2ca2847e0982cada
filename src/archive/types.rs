//! Core archive types
//!
//! Documents are immutable once published. A new publish (or a
//! republish by the minor version upgrade) creates a new revision that
//! shares the lineage id of its predecessors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one physical revision of a document.
///
/// Revision ids are allocated by the archive in insertion order and are
/// never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(u64);

impl RevisionId {
    /// Creates a new RevisionId with the given value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity shared by every revision of one logical document.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageId(Uuid);

impl LineageId {
    /// Wraps an existing UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a fresh random lineage id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of archived content.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PortalType {
    Module,
    Collection,
}

impl PortalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortalType::Module => "Module",
            PortalType::Collection => "Collection",
        }
    }
}

impl fmt::Display for PortalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published version of a document.
///
/// Modules carry no minor version. Collections always do; a new major
/// version starts at minor 1 and further minors only come from the
/// minor version upgrade.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: Option<u32>,
}

impl Version {
    /// Version of a module (major only).
    pub fn major(major: u32) -> Self {
        Self { major, minor: None }
    }

    /// Version of a collection.
    pub fn with_minor(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

/// A single archived document revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub revision: RevisionId,
    pub lineage: LineageId,
    /// Legacy identifier such as `m12345` or `col11522`
    pub legacy_id: String,
    pub name: String,
    pub portal_type: PortalType,
    pub version: Version,
    pub revised: DateTime<Utc>,
}

impl Document {
    pub fn is_collection(&self) -> bool {
        self.portal_type == PortalType::Collection
    }

    /// Revision id and revised time of this document.
    pub fn stamp(&self) -> RevisionStamp {
        RevisionStamp {
            revision: self.revision,
            revised: self.revised,
        }
    }
}

/// A revision id tagged with the time it was revised.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionStamp {
    pub revision: RevisionId,
    pub revised: DateTime<Utc>,
}

/// The revision that follows a collection revision within its lineage.
///
/// When the collection is the latest revision there is no follower and
/// the archive reports a synthetic one stamped "now" with minor 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NextRevision {
    pub revision: Option<RevisionId>,
    pub revised: DateTime<Utc>,
    pub minor: Option<u32>,
}

impl NextRevision {
    /// Synthetic follower for the latest revision of a lineage.
    pub fn synthetic(now: DateTime<Utc>) -> Self {
        Self {
            revision: None,
            revised: now,
            minor: Some(1),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.revision.is_none()
    }
}

/// Counted views of a document over a time range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRange {
    pub document: RevisionId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hits: u64,
}
