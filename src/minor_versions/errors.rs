//! Minor version reconstruction errors

use thiserror::Error;

use crate::archive::RevisionId;
use crate::store::ArchiveError;

/// Result type for reconstruction
pub type ReconstructResult<T> = Result<T, ReconstructError>;

/// Fatal reconstruction failures.
///
/// "Not a collection" and "already processed" are not errors; they are
/// reported through `Outcome`.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// Referenced data is missing: a data integrity problem upstream.
    #[error("lookup failed for collection {collection}: {source}")]
    Lookup {
        collection: RevisionId,
        #[source]
        source: ArchiveError,
    },

    /// The archive rejected a republish, tree rebuild or transaction step.
    #[error("archive failure for collection {collection}: {source}")]
    Store {
        collection: RevisionId,
        #[source]
        source: ArchiveError,
    },

    #[error("substitution chain starting at revision {0} never terminates")]
    CyclicSubstitution(RevisionId),
}

impl ReconstructError {
    /// Sorts an archive error into lookup or store failure.
    pub fn from_archive(collection: RevisionId, source: ArchiveError) -> Self {
        if source.is_lookup() {
            ReconstructError::Lookup { collection, source }
        } else {
            ReconstructError::Store { collection, source }
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, ReconstructError::Lookup { .. })
    }
}
