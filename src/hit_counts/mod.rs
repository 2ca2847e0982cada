//! Legacy hit count migration
//!
//! Reads the hit counter export of the legacy site and stores it as hit
//! ranges against the latest revision of each document.

mod errors;
mod migration;
mod parser;

pub use errors::{HitCountError, HitCountResult};
pub use migration::{migrate_hit_counts, ranges_for, MigrationSummary};
pub use parser::{parse_hits, HitRow};
