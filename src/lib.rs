//! cnxupgrade - one-shot upgrades for a cnx archive
//!
//! - `archive`: documents, versions and collection trees
//! - `store`: the archive store and its append-only log
//! - `minor_versions`: reconstruction of collection minor versions
//! - `hit_counts`: migration of legacy hit counters
//! - `observability`: structured logs, events and counters
//! - `cli`: the `cnx-upgrade` binary

pub mod archive;
pub mod cli;
pub mod hit_counts;
pub mod minor_versions;
pub mod observability;
pub mod store;
