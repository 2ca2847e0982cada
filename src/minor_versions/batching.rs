//! Grouping module revisions into minor versions
//!
//! Authors usually update several modules of a collection in one sitting.
//! Revisions close together in time become one minor version instead of
//! one minor version each.

use chrono::{DateTime, Duration, Utc};

use crate::archive::RevisionId;

/// A module revision published inside the window, and the revision it
/// supersedes in the collection tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub revision: RevisionId,
    pub replaces: RevisionId,
    pub revised: DateTime<Utc>,
}

/// Orders replacements by revised time.
///
/// The sort is stable: revisions published at the same instant keep the
/// order in which they were discovered.
pub fn sort_replacements(replacements: &mut [Replacement]) {
    replacements.sort_by_key(|r| r.revised);
}

/// Splits time-sorted replacements into batches.
///
/// A revision joins the current batch when it was published less than
/// `interval` after the last revision added to that batch; otherwise it
/// starts a new one. A batch can therefore span more than `interval`.
pub fn batch_replacements(sorted: &[Replacement], interval: Duration) -> Vec<Vec<Replacement>> {
    let mut batches: Vec<Vec<Replacement>> = Vec::new();

    for replacement in sorted {
        match batches.last_mut() {
            Some(batch) if joins(batch, replacement, interval) => batch.push(*replacement),
            _ => batches.push(vec![*replacement]),
        }
    }

    batches
}

fn joins(batch: &[Replacement], candidate: &Replacement, interval: Duration) -> bool {
    batch
        .last()
        .map(|last| candidate.revised - last.revised < interval)
        .unwrap_or(false)
}
