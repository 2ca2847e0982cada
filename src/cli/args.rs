//! CLI argument definitions using clap
//!
//! Commands:
//! - cnx-upgrade init --config <path>
//! - cnx-upgrade import --config <path> --input <fixture.json>
//! - cnx-upgrade minor-versions --config <path> [--collection <id>]...
//! - cnx-upgrade tree --config <path> --collection <id>
//! - cnx-upgrade hit-counts --config <path> --input <hits.csv>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cnx-upgrade - one-shot upgrades for a cnx archive
#[derive(Parser, Debug)]
#[command(name = "cnx-upgrade")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty archive
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./cnx-upgrade.json")]
        config: PathBuf,
    },

    /// Load documents and collection trees from a JSON fixture
    Import {
        /// Path to configuration file
        #[arg(long, default_value = "./cnx-upgrade.json")]
        config: PathBuf,

        /// Fixture file
        #[arg(long)]
        input: PathBuf,
    },

    /// Create the missing minor versions of collections
    MinorVersions {
        /// Path to configuration file
        #[arg(long, default_value = "./cnx-upgrade.json")]
        config: PathBuf,

        /// Collection revision to process; all collections when omitted
        #[arg(long = "collection")]
        collections: Vec<u64>,
    },

    /// Print the tree of a collection revision
    Tree {
        /// Path to configuration file
        #[arg(long, default_value = "./cnx-upgrade.json")]
        config: PathBuf,

        #[arg(long)]
        collection: u64,
    },

    /// Migrate legacy hit counts
    HitCounts {
        /// Path to configuration file
        #[arg(long, default_value = "./cnx-upgrade.json")]
        config: PathBuf,

        /// CSV export of the legacy hit counters
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_collection_flag() {
        let cli = Cli::try_parse_from([
            "cnx-upgrade",
            "minor-versions",
            "--collection",
            "4",
            "--collection",
            "9",
        ])
        .unwrap();

        match cli.command {
            Command::MinorVersions {
                config,
                collections,
            } => {
                assert_eq!(config, PathBuf::from("./cnx-upgrade.json"));
                assert_eq!(collections, vec![4, 9]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_hit_counts_requires_input() {
        assert!(Cli::try_parse_from(["cnx-upgrade", "hit-counts"]).is_err());
    }
}
