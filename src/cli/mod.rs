//! CLI module for cnx-upgrade
//!
//! Provides command-line interface for:
//! - init: Create an empty archive
//! - import: Load documents and trees from a fixture
//! - minor-versions: Create collection minor versions
//! - tree: Show a collection tree
//! - hit-counts: Migrate legacy hit counts

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{hit_counts, import, init, minor_versions, run, run_command, tree};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
