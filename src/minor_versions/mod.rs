//! Collection minor versions
//!
//! Legacy collections only recorded major versions. Whenever a module in
//! a collection changed between two major versions, readers saw a new
//! state of the collection that was never published. This module creates
//! those missing states as minor versions (`5.2`, `5.3`, ...) of the
//! collection, each with its own copy of the tree.
//!
//! The work is split into three steps:
//! - gathering the module revisions published inside the version window
//! - grouping them into batches by publication time (`batching`)
//! - republishing the collection and rebuilding its tree once per batch,
//!   with substitution chains collapsed first (`id_map`)

mod batching;
mod errors;
mod id_map;
mod reconstructor;

pub use batching::{batch_replacements, sort_replacements, Replacement};
pub use errors::{ReconstructError, ReconstructResult};
pub use id_map::collapse_id_map;
pub use reconstructor::{
    MinorVersion, Outcome, Reconstructor, ReconstructorConfig, DEFAULT_BATCHING_INTERVAL_HOURS,
};
