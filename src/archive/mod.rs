//! Archive data model
//!
//! Documents (modules and collections) are versioned by lineage. Each
//! collection revision owns one tree whose nodes reference the document
//! revisions that make up that version of the collection.

mod tree;
mod types;

pub use tree::{CollectionTree, IdMap, TreeNode, TreeSpec};
pub use types::{
    Document, HitRange, LineageId, NextRevision, PortalType, RevisionId, RevisionStamp, Version,
};
