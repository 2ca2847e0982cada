//! Hit range migration
//!
//! The legacy system kept two counters per document: hits over its whole
//! lifetime and hits during the last `interval`. The archive stores hit
//! counts per time range, so each row becomes at most two ranges:
//!
//! - past: `[start, end - interval)` with `past_hits - recent_hits`
//! - recent: `[max(start, end - interval), end]` with `recent_hits`

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::HitCountResult;
use super::parser::HitRow;
use crate::archive::{HitRange, RevisionId};
use crate::store::HitCountStore;

/// What a migration inserted
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub rows: usize,
    /// Rows whose legacy id has no revision in the archive
    pub skipped: usize,
    pub ranges_inserted: usize,
}

/// Splits one row into its hit ranges.
///
/// An interval reaching past the earliest representable date makes the
/// whole row recent.
pub fn ranges_for(row: &HitRow, document: RevisionId) -> Vec<HitRange> {
    let recent_start = row
        .end
        .checked_sub_signed(row.interval)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut ranges = Vec::with_capacity(2);

    if row.start < recent_start && row.past_hits > row.recent_hits {
        ranges.push(HitRange {
            document,
            start: row.start,
            end: recent_start,
            hits: row.past_hits - row.recent_hits,
        });
    }
    ranges.push(HitRange {
        document,
        start: row.start.max(recent_start),
        end: row.end,
        hits: row.recent_hits,
    });

    ranges
}

/// Inserts the hit ranges of every row in one transaction.
///
/// Each row is attached to the latest revision carrying its legacy id.
/// Rows for unknown legacy ids are skipped.
pub fn migrate_hit_counts<S>(store: &mut S, rows: &[HitRow]) -> HitCountResult<MigrationSummary>
where
    S: HitCountStore + ?Sized,
{
    store.begin()?;
    match insert_rows(store, rows) {
        Ok(summary) => {
            store.commit()?;
            Ok(summary)
        }
        Err(e) => {
            store.rollback()?;
            Err(e)
        }
    }
}

fn insert_rows<S>(store: &mut S, rows: &[HitRow]) -> HitCountResult<MigrationSummary>
where
    S: HitCountStore + ?Sized,
{
    let mut summary = MigrationSummary {
        rows: rows.len(),
        ..MigrationSummary::default()
    };

    for row in rows {
        let document = match store.latest_revision_for(&row.legacy_id)? {
            Some(document) => document,
            None => {
                summary.skipped += 1;
                continue;
            }
        };
        for range in ranges_for(row, document) {
            store.insert_hit_range(range)?;
            summary.ranges_inserted += 1;
        }
    }

    Ok(summary)
}
