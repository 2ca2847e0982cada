//! Collection minor version reconstruction
//!
//! Between two published versions of a collection, the modules in its
//! tree keep getting revised. Each group of module revisions gets its own
//! minor version of the collection: a republished collection revision
//! stamped with the time of the group's last revision, whose tree points
//! at the module revisions that were current at that time.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::batching::{batch_replacements, sort_replacements, Replacement};
use super::errors::{ReconstructError, ReconstructResult};
use super::id_map::collapse_id_map;
use crate::archive::{IdMap, PortalType, RevisionId};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::store::ArchiveStore;

/// Default gap that separates two minor versions.
pub const DEFAULT_BATCHING_INTERVAL_HOURS: i64 = 24;

/// Reconstructor settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconstructorConfig {
    pub batching_interval: Duration,
}

impl ReconstructorConfig {
    /// Intervals too long for a `Duration` saturate.
    pub fn with_interval_hours(hours: i64) -> Self {
        Self {
            batching_interval: Duration::try_hours(hours).unwrap_or(Duration::MAX),
        }
    }
}

impl Default for ReconstructorConfig {
    fn default() -> Self {
        Self::with_interval_hours(DEFAULT_BATCHING_INTERVAL_HOURS)
    }
}

/// A synthesized minor version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MinorVersion {
    pub revision: RevisionId,
    pub based_on: RevisionId,
    pub minor: u32,
    pub revised: DateTime<Utc>,
    /// Collapsed substitutions applied to the tree of `based_on`
    pub substitutions: IdMap,
}

/// Result of one reconstruction call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The revision is not a collection; nothing to do.
    NotACollection,
    /// Minor versions already exist for this window.
    AlreadyProcessed,
    /// Zero or more minor versions were created.
    Reconstructed { created: Vec<MinorVersion> },
}

impl Outcome {
    /// Number of minor versions created.
    pub fn created_count(&self) -> usize {
        match self {
            Outcome::Reconstructed { created } => created.len(),
            _ => 0,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !matches!(self, Outcome::Reconstructed { .. })
    }
}

/// Time span between a collection revision and the revision after it.
#[derive(Copy, Clone, Debug)]
struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Synthesizes collection minor versions.
#[derive(Clone, Debug, Default)]
pub struct Reconstructor {
    config: ReconstructorConfig,
}

impl Reconstructor {
    pub fn new(config: ReconstructorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconstructorConfig {
        &self.config
    }

    /// Creates the missing minor versions following `collection`.
    ///
    /// Idempotent: once minor versions exist after `collection`, further
    /// calls return `AlreadyProcessed`. All minor versions of one call are
    /// created in a single transaction; on error none of them remain.
    pub fn reconstruct<S>(&self, store: &mut S, collection: RevisionId) -> ReconstructResult<Outcome>
    where
        S: ArchiveStore + ?Sized,
    {
        let archive_err = |e| ReconstructError::from_archive(collection, e);
        let collection_field = collection.to_string();

        if store.minor_version(collection).map_err(archive_err)?.is_none() {
            Logger::trace(
                Event::ReconstructSkipped.as_str(),
                &[("collection", &collection_field), ("reason", "not_a_collection")],
            );
            return Ok(Outcome::NotACollection);
        }

        let (current, next) = store
            .current_and_next_revision(collection)
            .map_err(archive_err)?;

        if next.minor != Some(1) {
            log_event_with_fields(
                Event::ReconstructSkipped,
                &[("collection", &collection_field), ("reason", "already_processed")],
            );
            return Ok(Outcome::AlreadyProcessed);
        }

        let window = Window {
            start: current.revised,
            end: next.revised,
        };
        log_event_with_fields(
            Event::ReconstructBegin,
            &[
                ("collection", &collection_field),
                ("window_end", &window.end.to_rfc3339()),
                ("window_start", &window.start.to_rfc3339()),
            ],
        );

        let mut replacements = self.gather_replacements(&*store, collection, window)?;
        sort_replacements(&mut replacements);
        let batches = batch_replacements(&replacements, self.config.batching_interval);

        if batches.is_empty() {
            log_event_with_fields(
                Event::ReconstructComplete,
                &[("collection", &collection_field), ("created", "0")],
            );
            return Ok(Outcome::Reconstructed {
                created: Vec::new(),
            });
        }

        store.begin().map_err(archive_err)?;
        let created = match self
            .materialize(store, collection, &batches)
            .and_then(|created| store.commit().map(|()| created).map_err(archive_err))
        {
            Ok(created) => created,
            Err(e) => {
                if let Err(rollback_err) = store.rollback() {
                    Logger::error(
                        Event::ArchiveRollback.as_str(),
                        &[
                            ("collection", &collection_field),
                            ("error", &rollback_err.to_string()),
                        ],
                    );
                }
                log_event_with_fields(
                    Event::ReconstructFailed,
                    &[("collection", &collection_field), ("error", &e.to_string())],
                );
                return Err(e);
            }
        };

        log_event_with_fields(
            Event::ReconstructComplete,
            &[
                ("collection", &collection_field),
                ("created", &created.len().to_string()),
            ],
        );
        Ok(Outcome::Reconstructed { created })
    }

    /// Finds every module revision published inside the window and links
    /// each one to the revision it supersedes.
    fn gather_replacements<S>(
        &self,
        store: &S,
        collection: RevisionId,
        window: Window,
    ) -> ReconstructResult<Vec<Replacement>>
    where
        S: ArchiveStore + ?Sized,
    {
        let archive_err = |e| ReconstructError::from_archive(collection, e);
        let mut seen = HashSet::new();
        let mut replacements = Vec::new();

        for entry in store.walk_tree(collection).map_err(archive_err)? {
            if entry.portal_type != PortalType::Module || !seen.insert(entry.revision) {
                continue;
            }

            let after = window.start.max(entry.revised);
            let revisions = store
                .revisions_in_window(entry.lineage, after, window.end, entry.revision)
                .map_err(archive_err)?;

            let mut replaces = entry.revision;
            for stamp in revisions {
                replacements.push(Replacement {
                    revision: stamp.revision,
                    replaces,
                    revised: stamp.revised,
                });
                replaces = stamp.revision;
            }
        }

        Ok(replacements)
    }

    /// Republishes the collection once per batch and rebuilds its tree.
    fn materialize<S>(
        &self,
        store: &mut S,
        collection: RevisionId,
        batches: &[Vec<Replacement>],
    ) -> ReconstructResult<Vec<MinorVersion>>
    where
        S: ArchiveStore + ?Sized,
    {
        let archive_err = |e| ReconstructError::from_archive(collection, e);
        let mut created = Vec::with_capacity(batches.len());
        let mut current = collection;

        for batch in batches {
            let revised = match batch.last() {
                Some(last) => last.revised,
                None => continue,
            };

            let minor = store.next_minor_version(current).map_err(archive_err)?;
            let revision = store
                .republish_collection(minor, current, revised)
                .map_err(archive_err)?;

            let mut id_map = IdMap::new();
            id_map.insert(current, revision);
            for member in batch {
                id_map.insert(member.replaces, member.revision);
            }
            let substitutions = collapse_id_map(&id_map)?;

            store
                .rebuild_tree(current, &substitutions)
                .map_err(archive_err)?;

            log_event_with_fields(
                Event::MinorVersionCreated,
                &[
                    ("based_on", &current.to_string()),
                    ("minor", &minor.to_string()),
                    ("revised", &revised.to_rfc3339()),
                    ("revision", &revision.to_string()),
                ],
            );

            created.push(MinorVersion {
                revision,
                based_on: current,
                minor,
                revised,
                substitutions,
            });
            current = revision;
        }

        Ok(created)
    }
}
