//! CLI command implementations
//!
//! Each command loads the configuration, opens the archive and returns
//! its result as JSON. `run_command` writes that result to stdout.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::archive::RevisionId;
use crate::hit_counts::{migrate_hit_counts, parse_hits};
use crate::minor_versions::Reconstructor;
use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsRegistry, ObservationScope,
};
use crate::store::{log_path, Archive, ArchiveFixture};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and print its result
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Init { config } => init(&config)?,
        Command::Import { config, input } => import(&config, &input)?,
        Command::MinorVersions {
            config,
            collections,
        } => minor_versions(&config, &collections)?,
        Command::Tree { config, collection } => tree(&config, collection)?,
        Command::HitCounts { config, input } => hit_counts(&config, &input)?,
    };
    write_response(result)
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("archive_dir", &config.archive_dir),
            ("halt_on_error", &config.halt_on_error.to_string()),
        ],
    );
    Ok(config)
}

fn is_initialized(archive_dir: &Path) -> bool {
    log_path(archive_dir).exists()
}

/// Opens an initialized archive. Log corruption is reported as FATAL.
fn open_archive(config: &Config) -> CliResult<Archive> {
    let archive_dir = config.archive_path();
    if !is_initialized(archive_dir) {
        return Err(CliError::not_initialized());
    }

    Archive::open(archive_dir).map_err(|e| {
        if e.is_fatal() {
            log_event_with_fields(Event::ArchiveCorruption, &[("error", &e.to_string())]);
        }
        CliError::from(e)
    })
}

/// Create an empty archive
///
/// Fails if the archive directory already holds an archive log.
pub fn init(config_path: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let archive_dir = config.archive_path();

    if is_initialized(archive_dir) {
        return Err(CliError::already_initialized());
    }

    Archive::open(archive_dir)?;

    Ok(json!({
        "initialized": true,
        "archive_dir": config.archive_dir,
    }))
}

/// Load a JSON fixture of documents and trees as one unit of work
pub fn import(config_path: &Path, input: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let content = fs::read_to_string(input)
        .map_err(|e| CliError::invalid_input(format!("Failed to read {}: {}", input.display(), e)))?;
    let fixture: ArchiveFixture = serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_input(format!("Invalid fixture JSON: {}", e)))?;

    let mut archive = open_archive(&config)?;
    let summary = archive.import(&fixture)?;

    log_event_with_fields(
        Event::ImportComplete,
        &[
            ("documents", &summary.documents.to_string()),
            ("nodes", &summary.nodes.to_string()),
            ("trees", &summary.trees.to_string()),
        ],
    );

    Ok(serde_json::to_value(summary)?)
}

/// Create the missing minor versions of the given collections
///
/// Without explicit ids every collection revision is processed, oldest
/// first. Each collection commits on its own. With `halt_on_error` the
/// first failure ends the run; otherwise it is recorded and the run goes on.
pub fn minor_versions(config_path: &Path, collections: &[u64]) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let mut archive = open_archive(&config)?;
    let reconstructor = Reconstructor::new(config.reconstructor_config());
    let metrics = MetricsRegistry::new();

    let targets: Vec<RevisionId> = if collections.is_empty() {
        archive.collections()
    } else {
        collections.iter().copied().map(RevisionId::new).collect()
    };

    let target_count = targets.len().to_string();
    let scope = ObservationScope::with_fields("MINOR_VERSION_RUN", &[("collections", &target_count)]);
    let mut results = Vec::with_capacity(targets.len());

    for collection in targets {
        match reconstructor.reconstruct(&mut archive, collection) {
            Ok(outcome) => {
                if outcome.is_skipped() {
                    metrics.increment_collections_skipped();
                } else {
                    metrics.increment_collections_processed();
                    metrics.add_minor_versions(outcome.created_count() as u64);
                }
                results.push(json!({
                    "collection": collection,
                    "result": outcome,
                }));
            }
            Err(e) => {
                metrics.increment_collections_failed();
                if config.halt_on_error {
                    scope.fail(&e.to_string());
                    return Err(e.into());
                }
                Logger::warn(
                    Event::ReconstructFailed.as_str(),
                    &[("collection", &collection.to_string()), ("action", "continue")],
                );
                results.push(json!({
                    "collection": collection,
                    "error": e.to_string(),
                }));
            }
        }
    }

    let snapshot = metrics.snapshot();
    scope.complete_with_fields(&[
        ("created", &snapshot.minor_versions_created.to_string()),
        ("failed", &snapshot.collections_failed.to_string()),
    ]);

    Ok(json!({
        "results": results,
        "metrics": snapshot,
    }))
}

/// Show the tree of a collection revision
pub fn tree(config_path: &Path, collection: u64) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let archive = open_archive(&config)?;
    let collection = RevisionId::new(collection);

    if archive.document(collection).is_none() {
        return Err(CliError::not_found(format!("Revision {} not found", collection)));
    }
    let tree = archive
        .tree(collection)?
        .ok_or_else(|| CliError::not_found(format!("Revision {} has no tree", collection)))?;

    Ok(json!({
        "collection": collection,
        "tree": tree.to_spec(),
    }))
}

/// Migrate the legacy hit counter export
pub fn hit_counts(config_path: &Path, input: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let content = fs::read_to_string(input)
        .map_err(|e| CliError::invalid_input(format!("Failed to read {}: {}", input.display(), e)))?;
    let rows = parse_hits(&content)?;

    let mut archive = open_archive(&config)?;
    let metrics = MetricsRegistry::new();
    let summary = migrate_hit_counts(&mut archive, &rows)?;
    metrics.add_hit_ranges(summary.ranges_inserted as u64);

    log_event_with_fields(
        Event::HitCountsMigrated,
        &[
            ("ranges", &summary.ranges_inserted.to_string()),
            ("rows", &summary.rows.to_string()),
            ("skipped", &summary.skipped.to_string()),
        ],
    );

    Ok(json!({
        "summary": summary,
        "metrics": metrics.snapshot(),
    }))
}
