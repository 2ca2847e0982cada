//! Shared fixtures for the integration suites.
//!
//! The scenario archive holds one collection `c1` published as 5.1, 6.1
//! and 7.1, with three modules revised in between:
//!
//! | id | document | version | revised (-07:00) |
//! |----|----------|---------|------------------|
//! | 1  | m1       | 1       | 10-01 11:24      |
//! | 2  | m2       | 9       | 10-01 12:24      |
//! | 3  | m3       | 1       | 10-01 13:24      |
//! | 4  | c1       | 5.1     | 10-02 21:43      |
//! | 5  | m1       | 2       | 10-03 09:00      |
//! | 6  | c1       | 6.1     | 10-03 12:00      |
//! | 7  | m1       | 3       | 10-03 12:01      |
//! | 8  | m2       | 10      | 10-05 12:02      |
//! | 9  | m2       | 11      | 10-05 18:03      |
//! | 10 | m3       | 2       | 10-05 23:05      |
//! | 11 | m3       | 3       | 10-06 12:05      |
//! | 12 | c1       | 7.1     | 10-07 12:00      |

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use cnxupgrade::archive::{Document, LineageId, PortalType, RevisionId, TreeSpec, Version};
use cnxupgrade::store::{Archive, ArchiveFixture};

pub const C1_5_1: RevisionId = RevisionId::new(4);
pub const C1_6_1: RevisionId = RevisionId::new(6);
pub const C1_7_1: RevisionId = RevisionId::new(12);

/// 2013-10-`day` `hour`:`minute` at -07:00
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    FixedOffset::west_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(2013, 10, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn rev(id: u64) -> RevisionId {
    RevisionId::new(id)
}

pub fn document(
    revision: u64,
    lineage: LineageId,
    legacy_id: &str,
    portal_type: PortalType,
    version: Version,
    revised: DateTime<Utc>,
) -> Document {
    Document {
        revision: rev(revision),
        lineage,
        legacy_id: legacy_id.to_string(),
        name: format!("Name of {}", legacy_id),
        portal_type,
        version,
        revised,
    }
}

fn tree(collection: u64, modules: [u64; 3]) -> TreeSpec {
    TreeSpec::with_children(
        rev(collection),
        modules.iter().map(|m| TreeSpec::leaf(rev(*m))).collect(),
    )
}

pub fn scenario_fixture() -> ArchiveFixture {
    let c1 = LineageId::generate();
    let m1 = LineageId::generate();
    let m2 = LineageId::generate();
    let m3 = LineageId::generate();
    let module = PortalType::Module;
    let collection = PortalType::Collection;

    ArchiveFixture {
        documents: vec![
            document(1, m1, "m1", module, Version::major(1), at(1, 11, 24)),
            document(2, m2, "m2", module, Version::major(9), at(1, 12, 24)),
            document(3, m3, "m3", module, Version::major(1), at(1, 13, 24)),
            document(4, c1, "c1", collection, Version::with_minor(5, 1), at(2, 21, 43)),
            document(5, m1, "m1", module, Version::major(2), at(3, 9, 0)),
            document(6, c1, "c1", collection, Version::with_minor(6, 1), at(3, 12, 0)),
            document(7, m1, "m1", module, Version::major(3), at(3, 12, 1)),
            document(8, m2, "m2", module, Version::major(10), at(5, 12, 2)),
            document(9, m2, "m2", module, Version::major(11), at(5, 18, 3)),
            document(10, m3, "m3", module, Version::major(2), at(5, 23, 5)),
            document(11, m3, "m3", module, Version::major(3), at(6, 12, 5)),
            document(12, c1, "c1", collection, Version::with_minor(7, 1), at(7, 12, 0)),
        ],
        trees: vec![tree(4, [1, 2, 3]), tree(6, [5, 2, 3]), tree(12, [7, 9, 11])],
    }
}

/// In-memory scenario archive with "now" pinned to 2013-11-01.
pub fn scenario_archive() -> Archive {
    let mut archive = Archive::in_memory();
    archive.pin_clock(at(31, 12, 0) + chrono::Duration::days(1));
    archive.import(&scenario_fixture()).unwrap();
    archive
}
