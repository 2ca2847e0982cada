//! The archive: documents, collection trees and hit ranges.
//!
//! The whole archive is held in memory. When opened from a directory,
//! `archive.log` is replayed on open and committed changes are appended
//! to it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ArchiveError, ArchiveResult};
use super::reader::ArchiveLogReader;
use super::record::LogEntry;
use super::writer::{log_path, ArchiveLogWriter};
use super::{ArchiveStore, HitCountStore, Transactional, TreeEntry};
use crate::observability::{log_event_with_fields, Event};
use crate::archive::{
    CollectionTree, Document, HitRange, IdMap, LineageId, NextRevision, PortalType, RevisionId,
    RevisionStamp, TreeNode, TreeSpec, Version,
};

/// Documents and trees to load into an archive.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArchiveFixture {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub trees: Vec<TreeSpec>,
}

/// What an import added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub documents: usize,
    pub trees: usize,
    pub nodes: usize,
}

/// In-memory archive with optional log persistence.
pub struct Archive {
    documents: BTreeMap<RevisionId, Document>,
    nodes: BTreeMap<u64, TreeNode>,
    hits: Vec<HitRange>,
    /// lineage -> revisions in insertion order
    lineages: HashMap<LineageId, Vec<RevisionId>>,
    /// collection revision -> root node of its tree
    tree_roots: HashMap<RevisionId, u64>,
    /// parent node -> child nodes in insertion order
    children: HashMap<u64, Vec<u64>>,
    /// Applied but not yet committed changes, oldest first
    pending: Vec<LogEntry>,
    in_transaction: bool,
    log: Option<ArchiveLogWriter>,
    clock: Option<DateTime<Utc>>,
}

impl Archive {
    /// Creates an empty archive that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            documents: BTreeMap::new(),
            nodes: BTreeMap::new(),
            hits: Vec::new(),
            lineages: HashMap::new(),
            tree_roots: HashMap::new(),
            children: HashMap::new(),
            pending: Vec::new(),
            in_transaction: false,
            log: None,
            clock: None,
        }
    }

    /// Opens (or creates) the archive stored under `archive_dir`.
    ///
    /// # Errors
    ///
    /// `CNX_ARCHIVE_DATA_CORRUPTION` if any log record fails its checksum
    /// or cannot be applied.
    pub fn open(archive_dir: &Path) -> ArchiveResult<Self> {
        let mut archive = Self::in_memory();

        let path = log_path(archive_dir);
        if path.exists() {
            let mut reader = ArchiveLogReader::open(&path)?;
            loop {
                let offset = reader.current_offset();
                match reader.read_next()? {
                    Some(entry) => archive.apply(&entry).map_err(|e| {
                        ArchiveError::corruption_at_offset(
                            offset,
                            format!("Log record cannot be replayed: {}", e.message()),
                        )
                    })?,
                    None => break,
                }
            }
        }

        archive.log = Some(ArchiveLogWriter::open(archive_dir)?);
        log_event_with_fields(
            Event::ArchiveOpened,
            &[
                ("documents", &archive.documents.len().to_string()),
                ("nodes", &archive.nodes.len().to_string()),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(archive)
    }

    /// Pins "now" for the synthetic follower of latest revisions.
    pub fn pin_clock(&mut self, now: DateTime<Utc>) {
        self.clock = Some(now);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    pub fn is_persistent(&self) -> bool {
        self.log.is_some()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn document(&self, revision: RevisionId) -> Option<&Document> {
        self.documents.get(&revision)
    }

    fn require(&self, revision: RevisionId) -> ArchiveResult<&Document> {
        self.documents
            .get(&revision)
            .ok_or_else(|| ArchiveError::missing_revision(revision))
    }

    /// Revisions of a lineage ordered by revised time, then revision id.
    pub fn lineage_revisions(&self, lineage: LineageId) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .lineages
            .get(&lineage)
            .map(|ids| ids.iter().filter_map(|id| self.documents.get(id)).collect())
            .unwrap_or_default();
        docs.sort_by_key(|d| (d.revised, d.revision));
        docs
    }

    /// Finds the revision of a lineage published at `version`.
    pub fn find_version(&self, lineage: LineageId, version: Version) -> Option<&Document> {
        self.lineages
            .get(&lineage)?
            .iter()
            .filter_map(|id| self.documents.get(id))
            .find(|d| d.version == version)
    }

    /// All collection revisions ordered by revised time.
    pub fn collections(&self) -> Vec<RevisionId> {
        let mut collections: Vec<&Document> =
            self.documents.values().filter(|d| d.is_collection()).collect();
        collections.sort_by_key(|d| (d.revised, d.revision));
        collections.iter().map(|d| d.revision).collect()
    }

    /// The tree owned by a collection revision, if it has one.
    pub fn tree(&self, collection: RevisionId) -> ArchiveResult<Option<CollectionTree>> {
        self.require(collection)?;

        let root_id = match self.tree_roots.get(&collection) {
            Some(id) => *id,
            None => return Ok(None),
        };
        let root = self
            .nodes
            .get(&root_id)
            .ok_or_else(|| ArchiveError::lookup_failed(format!("Tree node {} missing", root_id)))?;

        let mut children: HashMap<u64, Vec<&TreeNode>> = HashMap::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root_id];
        while let Some(node_id) = stack.pop() {
            if !seen.insert(node_id) {
                continue;
            }
            if let Some(kids) = self.children.get(&node_id) {
                let entry = children.entry(node_id).or_default();
                for kid in kids {
                    if let Some(node) = self.nodes.get(kid) {
                        entry.push(node);
                        stack.push(*kid);
                    }
                }
            }
        }

        Ok(Some(CollectionTree::assemble(root, &children)))
    }

    pub fn hit_ranges(&self) -> &[HitRange] {
        &self.hits
    }

    fn next_revision_id(&self) -> RevisionId {
        RevisionId::new(
            self.documents
                .keys()
                .next_back()
                .map(|r| r.value() + 1)
                .unwrap_or(1),
        )
    }

    fn next_node_id(&self) -> u64 {
        self.nodes.keys().next_back().map(|n| n + 1).unwrap_or(1)
    }

    /// Inserts a document under its own revision id.
    pub fn insert_document(&mut self, document: Document) -> ArchiveResult<RevisionId> {
        let revision = document.revision;
        self.record(LogEntry::Document(document))?;
        Ok(revision)
    }

    /// Publishes a new document revision under the next free revision id.
    pub fn publish(
        &mut self,
        lineage: LineageId,
        legacy_id: &str,
        name: &str,
        portal_type: PortalType,
        version: Version,
        revised: DateTime<Utc>,
    ) -> ArchiveResult<RevisionId> {
        let document = Document {
            revision: self.next_revision_id(),
            lineage,
            legacy_id: legacy_id.to_string(),
            name: name.to_string(),
            portal_type,
            version,
            revised,
        };
        self.insert_document(document)
    }

    /// Stores a tree for the collection named by `spec.document`.
    ///
    /// Returns the root node id.
    pub fn insert_tree(&mut self, spec: &TreeSpec) -> ArchiveResult<u64> {
        let root_doc = self.require(spec.document)?;
        if !root_doc.is_collection() {
            return Err(ArchiveError::invalid_input(format!(
                "Tree root {} is not a collection",
                spec.document
            )));
        }
        if self.tree_roots.contains_key(&spec.document) {
            return Err(ArchiveError::invalid_input(format!(
                "Collection {} already has a tree",
                spec.document
            )));
        }

        let mut next_node_id = self.next_node_id();
        let nodes = spec.flatten(&mut next_node_id);
        let root_id = nodes[0].node_id;
        for node in nodes {
            self.record(LogEntry::TreeNode(node))?;
        }
        Ok(root_id)
    }

    /// Loads a fixture as one unit of work.
    pub fn import(&mut self, fixture: &ArchiveFixture) -> ArchiveResult<ImportSummary> {
        let nodes_before = self.nodes.len();
        self.begin()?;

        match self.load_fixture(fixture) {
            Ok(()) => {
                self.commit()?;
                Ok(ImportSummary {
                    documents: fixture.documents.len(),
                    trees: fixture.trees.len(),
                    nodes: self.nodes.len() - nodes_before,
                })
            }
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    fn load_fixture(&mut self, fixture: &ArchiveFixture) -> ArchiveResult<()> {
        for document in &fixture.documents {
            self.insert_document(document.clone())?;
        }
        for tree in &fixture.trees {
            self.insert_tree(tree)?;
        }
        Ok(())
    }

    /// Applies a change and queues it for the log.
    fn record(&mut self, entry: LogEntry) -> ArchiveResult<()> {
        self.apply(&entry)?;
        self.pending.push(entry);
        if !self.in_transaction {
            self.flush()?;
        }
        Ok(())
    }

    /// Appends pending changes to the log. On failure they are undone.
    fn flush(&mut self) -> ArchiveResult<()> {
        let pending = std::mem::take(&mut self.pending);
        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(&pending) {
                self.undo_all(pending);
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo_all(&mut self, pending: Vec<LogEntry>) {
        for entry in pending.iter().rev() {
            self.undo(entry);
        }
    }

    /// Validates and indexes one change.
    fn apply(&mut self, entry: &LogEntry) -> ArchiveResult<()> {
        match entry {
            LogEntry::Document(doc) => {
                if self.documents.contains_key(&doc.revision) {
                    return Err(ArchiveError::invalid_input(format!(
                        "Revision {} already exists",
                        doc.revision
                    )));
                }
                self.lineages.entry(doc.lineage).or_default().push(doc.revision);
                self.documents.insert(doc.revision, doc.clone());
            }
            LogEntry::TreeNode(node) => {
                if self.nodes.contains_key(&node.node_id) {
                    return Err(ArchiveError::invalid_input(format!(
                        "Tree node {} already exists",
                        node.node_id
                    )));
                }
                self.require(node.document)?;
                match node.parent {
                    Some(parent) => {
                        if !self.nodes.contains_key(&parent) {
                            return Err(ArchiveError::lookup_failed(format!(
                                "Parent node {} of node {} missing",
                                parent, node.node_id
                            )));
                        }
                        self.children.entry(parent).or_default().push(node.node_id);
                    }
                    None => {
                        self.tree_roots.entry(node.document).or_insert(node.node_id);
                    }
                }
                self.nodes.insert(node.node_id, node.clone());
            }
            LogEntry::HitRange(range) => {
                self.require(range.document)?;
                self.hits.push(range.clone());
            }
        }
        Ok(())
    }

    /// Reverses `apply`. Changes are undone newest first.
    fn undo(&mut self, entry: &LogEntry) {
        match entry {
            LogEntry::Document(doc) => {
                self.documents.remove(&doc.revision);
                if let Some(ids) = self.lineages.get_mut(&doc.lineage) {
                    ids.retain(|id| *id != doc.revision);
                    if ids.is_empty() {
                        self.lineages.remove(&doc.lineage);
                    }
                }
            }
            LogEntry::TreeNode(node) => {
                self.nodes.remove(&node.node_id);
                self.children.remove(&node.node_id);
                match node.parent {
                    Some(parent) => {
                        if let Some(kids) = self.children.get_mut(&parent) {
                            kids.retain(|id| *id != node.node_id);
                        }
                    }
                    None => {
                        if self.tree_roots.get(&node.document) == Some(&node.node_id) {
                            self.tree_roots.remove(&node.document);
                        }
                    }
                }
            }
            LogEntry::HitRange(_) => {
                self.hits.pop();
            }
        }
    }
}

impl Transactional for Archive {
    fn begin(&mut self) -> ArchiveResult<()> {
        if self.in_transaction {
            return Err(ArchiveError::transaction("Transaction already in progress"));
        }
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> ArchiveResult<()> {
        if !self.in_transaction {
            return Err(ArchiveError::transaction("Commit without transaction"));
        }
        self.in_transaction = false;
        let entries = self.pending.len().to_string();
        self.flush()?;
        log_event_with_fields(Event::ArchiveCommit, &[("entries", &entries)]);
        Ok(())
    }

    fn rollback(&mut self) -> ArchiveResult<()> {
        if !self.in_transaction {
            return Err(ArchiveError::transaction("Rollback without transaction"));
        }
        self.in_transaction = false;
        let pending = std::mem::take(&mut self.pending);
        let entries = pending.len().to_string();
        self.undo_all(pending);
        log_event_with_fields(Event::ArchiveRollback, &[("entries", &entries)]);
        Ok(())
    }
}

impl ArchiveStore for Archive {
    fn current_and_next_revision(
        &self,
        collection: RevisionId,
    ) -> ArchiveResult<(RevisionStamp, NextRevision)> {
        let current = self.require(collection)?;
        let key = (current.revised, current.revision);

        let next = self
            .lineage_revisions(current.lineage)
            .into_iter()
            .find(|d| (d.revised, d.revision) > key)
            .map(|d| NextRevision {
                revision: Some(d.revision),
                revised: d.revised,
                minor: d.version.minor,
            })
            .unwrap_or_else(|| NextRevision::synthetic(self.now()));

        Ok((current.stamp(), next))
    }

    fn minor_version(&self, revision: RevisionId) -> ArchiveResult<Option<u32>> {
        let document = self.require(revision)?;
        if !document.is_collection() {
            return Ok(None);
        }
        match document.version.minor {
            Some(minor) => Ok(Some(minor)),
            None => Err(ArchiveError::lookup_failed(format!(
                "Collection {} has no minor version",
                revision
            ))),
        }
    }

    fn walk_tree(&self, collection: RevisionId) -> ArchiveResult<Vec<TreeEntry>> {
        let tree = match self.tree(collection)? {
            Some(tree) => tree,
            None => return Ok(Vec::new()),
        };

        tree.nodes()[1..]
            .iter()
            .map(|node| {
                let doc = self.require(node.document)?;
                Ok(TreeEntry {
                    revision: doc.revision,
                    lineage: doc.lineage,
                    portal_type: doc.portal_type,
                    revised: doc.revised,
                })
            })
            .collect()
    }

    fn revisions_in_window(
        &self,
        lineage: LineageId,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
        exclude: RevisionId,
    ) -> ArchiveResult<Vec<RevisionStamp>> {
        Ok(self
            .lineage_revisions(lineage)
            .into_iter()
            .filter(|d| d.revised > after && d.revised < before && d.revision != exclude)
            .map(Document::stamp)
            .collect())
    }

    fn next_minor_version(&self, collection: RevisionId) -> ArchiveResult<u32> {
        let current = self.require(collection)?;
        let highest = self
            .lineage_revisions(current.lineage)
            .into_iter()
            .filter(|d| d.version.major == current.version.major)
            .filter_map(|d| d.version.minor)
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }

    fn republish_collection(
        &mut self,
        minor_version: u32,
        base: RevisionId,
        revised: DateTime<Utc>,
    ) -> ArchiveResult<RevisionId> {
        let base_doc = self.require(base)?;
        if !base_doc.is_collection() {
            return Err(ArchiveError::invalid_input(format!(
                "Revision {} is not a collection",
                base
            )));
        }

        let version = Version::with_minor(base_doc.version.major, minor_version);
        if self.find_version(base_doc.lineage, version).is_some() {
            return Err(ArchiveError::invalid_input(format!(
                "Version {} of {} already exists",
                version, base_doc.lineage
            )));
        }

        let document = Document {
            revision: self.next_revision_id(),
            version,
            revised,
            ..base_doc.clone()
        };
        self.insert_document(document)
    }

    fn rebuild_tree(&mut self, original: RevisionId, id_map: &IdMap) -> ArchiveResult<()> {
        let target = id_map.get(&original).copied().ok_or_else(|| {
            ArchiveError::invalid_input(format!(
                "Substitution map does not rebind collection {}",
                original
            ))
        })?;
        self.require(target)?;
        if self.tree_roots.contains_key(&target) {
            return Err(ArchiveError::invalid_input(format!(
                "Collection {} already has a tree",
                target
            )));
        }
        for replacement in id_map.values() {
            self.require(*replacement)?;
        }

        let tree = self.tree(original)?.ok_or_else(|| {
            ArchiveError::lookup_failed(format!("Collection {} has no tree", original))
        })?;

        let mut next_node_id = self.next_node_id();
        for node in tree.substitute(id_map, &mut next_node_id) {
            self.record(LogEntry::TreeNode(node))?;
        }
        Ok(())
    }
}

impl HitCountStore for Archive {
    fn latest_revision_for(&self, legacy_id: &str) -> ArchiveResult<Option<RevisionId>> {
        Ok(self
            .documents
            .values()
            .filter(|d| d.legacy_id == legacy_id)
            .max_by_key(|d| (d.revised, d.revision))
            .map(|d| d.revision))
    }

    fn insert_hit_range(&mut self, range: HitRange) -> ArchiveResult<()> {
        self.record(LogEntry::HitRange(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 10, 1, 12, 0, 0).unwrap()
    }

    struct Sample {
        archive: Archive,
        collection: RevisionId,
        m1: RevisionId,
        m2: RevisionId,
    }

    fn sample() -> Sample {
        let mut archive = Archive::in_memory();
        let c = LineageId::generate();
        let m1 = archive
            .publish(LineageId::generate(), "m1", "m1", PortalType::Module, Version::major(1), t0())
            .unwrap();
        let m2 = archive
            .publish(LineageId::generate(), "m2", "m2", PortalType::Module, Version::major(1), t0())
            .unwrap();
        let collection = archive
            .publish(
                c,
                "col1",
                "col1",
                PortalType::Collection,
                Version::with_minor(1, 1),
                t0() + Duration::hours(1),
            )
            .unwrap();
        archive
            .insert_tree(&TreeSpec::with_children(
                collection,
                vec![TreeSpec::leaf(m1), TreeSpec::leaf(m2)],
            ))
            .unwrap();
        Sample {
            archive,
            collection,
            m1,
            m2,
        }
    }

    #[test]
    fn test_publish_allocates_sequential_ids() {
        let s = sample();
        assert_eq!(s.m1, RevisionId::new(1));
        assert_eq!(s.m2, RevisionId::new(2));
        assert_eq!(s.collection, RevisionId::new(3));
    }

    #[test]
    fn test_latest_revision_gets_synthetic_follower() {
        let mut s = sample();
        let now = t0() + Duration::days(30);
        s.archive.pin_clock(now);

        let (current, next) = s.archive.current_and_next_revision(s.collection).unwrap();
        assert_eq!(current.revision, s.collection);
        assert!(next.is_synthetic());
        assert_eq!(next.revised, now);
        assert_eq!(next.minor, Some(1));
    }

    #[test]
    fn test_minor_version_of_module_is_none() {
        let s = sample();
        assert_eq!(s.archive.minor_version(s.m1).unwrap(), None);
        assert_eq!(s.archive.minor_version(s.collection).unwrap(), Some(1));
        assert!(s
            .archive
            .minor_version(RevisionId::new(99))
            .unwrap_err()
            .is_lookup());
    }

    #[test]
    fn test_walk_tree_excludes_root() {
        let s = sample();
        let entries = s.archive.walk_tree(s.collection).unwrap();
        let revisions: Vec<_> = entries.iter().map(|e| e.revision).collect();
        assert_eq!(revisions, vec![s.m1, s.m2]);
        assert!(entries.iter().all(|e| e.portal_type == PortalType::Module));
    }

    #[test]
    fn test_republish_and_rebuild() {
        let mut s = sample();
        let lineage = s.archive.document(s.m1).unwrap().lineage;
        let m1_v2 = s
            .archive
            .publish(lineage, "m1", "m1", PortalType::Module, Version::major(2), t0() + Duration::hours(2))
            .unwrap();

        assert_eq!(s.archive.next_minor_version(s.collection).unwrap(), 2);
        let new_rev = s
            .archive
            .republish_collection(2, s.collection, t0() + Duration::hours(2))
            .unwrap();
        assert_eq!(
            s.archive.document(new_rev).unwrap().version,
            Version::with_minor(1, 2)
        );

        let mut id_map = IdMap::new();
        id_map.insert(s.collection, new_rev);
        id_map.insert(s.m1, m1_v2);
        s.archive.rebuild_tree(s.collection, &id_map).unwrap();

        let tree = s.archive.tree(new_rev).unwrap().unwrap();
        assert_eq!(tree.documents(), vec![new_rev, m1_v2, s.m2]);

        // the original tree is untouched
        let original = s.archive.tree(s.collection).unwrap().unwrap();
        assert_eq!(original.documents(), vec![s.collection, s.m1, s.m2]);
    }

    #[test]
    fn test_republish_rejects_existing_version() {
        let mut s = sample();
        let err = s
            .archive
            .republish_collection(1, s.collection, t0())
            .unwrap_err();
        assert!(err.message().contains("already exists"));
    }

    #[test]
    fn test_rebuild_requires_collection_rebinding() {
        let mut s = sample();
        let err = s.archive.rebuild_tree(s.collection, &IdMap::new()).unwrap_err();
        assert!(err.message().contains("does not rebind"));
    }

    #[test]
    fn test_rollback_discards_changes() {
        let mut s = sample();
        let documents = s.archive.document_count();
        let nodes = s.archive.node_count();

        s.archive.begin().unwrap();
        let new_rev = s
            .archive
            .republish_collection(2, s.collection, t0() + Duration::hours(3))
            .unwrap();
        let mut id_map = IdMap::new();
        id_map.insert(s.collection, new_rev);
        s.archive.rebuild_tree(s.collection, &id_map).unwrap();
        assert!(s.archive.tree(new_rev).unwrap().is_some());
        s.archive.rollback().unwrap();

        assert_eq!(s.archive.document_count(), documents);
        assert_eq!(s.archive.node_count(), nodes);
        assert!(s.archive.document(new_rev).is_none());
        assert_eq!(s.archive.next_minor_version(s.collection).unwrap(), 2);
    }

    #[test]
    fn test_nested_begin_rejected() {
        let mut archive = Archive::in_memory();
        archive.begin().unwrap();
        assert!(archive.begin().is_err());
        archive.commit().unwrap();
        assert!(archive.commit().is_err());
        assert!(archive.rollback().is_err());
    }

    #[test]
    fn test_tree_node_must_reference_existing_document() {
        let mut s = sample();
        let err = s
            .archive
            .insert_tree(&TreeSpec::leaf(RevisionId::new(42)))
            .unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut archive = Archive::in_memory();
        let lineage = LineageId::generate();
        let collection = Document {
            revision: RevisionId::new(5),
            lineage,
            legacy_id: "col1".to_string(),
            name: "col1".to_string(),
            portal_type: PortalType::Collection,
            version: Version::with_minor(1, 1),
            revised: t0(),
        };
        let fixture = ArchiveFixture {
            documents: vec![collection],
            trees: vec![TreeSpec::with_children(
                RevisionId::new(5),
                vec![TreeSpec::leaf(RevisionId::new(6))],
            )],
        };

        assert!(archive.import(&fixture).is_err());
        assert_eq!(archive.document_count(), 0);
        assert_eq!(archive.node_count(), 0);
        assert!(!archive.in_transaction());
    }

    #[test]
    fn test_persisted_archive_replays() {
        let temp_dir = TempDir::new().unwrap();
        let (collection, m1, m2) = {
            let mut archive = Archive::open(temp_dir.path()).unwrap();
            let c = archive
                .publish(LineageId::generate(), "col1", "col1", PortalType::Collection, Version::with_minor(1, 1), t0())
                .unwrap();
            let m1 = archive
                .publish(LineageId::generate(), "m1", "m1", PortalType::Module, Version::major(1), t0())
                .unwrap();
            let m2 = archive
                .publish(LineageId::generate(), "m2", "m2", PortalType::Module, Version::major(1), t0())
                .unwrap();
            archive
                .insert_tree(&TreeSpec::with_children(c, vec![TreeSpec::leaf(m1), TreeSpec::leaf(m2)]))
                .unwrap();
            (c, m1, m2)
        };

        let archive = Archive::open(temp_dir.path()).unwrap();
        assert_eq!(archive.document_count(), 3);
        let tree = archive.tree(collection).unwrap().unwrap();
        assert_eq!(tree.documents(), vec![collection, m1, m2]);
    }

    #[test]
    fn test_rolled_back_changes_never_reach_the_log() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut archive = Archive::open(temp_dir.path()).unwrap();
            archive
                .publish(LineageId::generate(), "m1", "m1", PortalType::Module, Version::major(1), t0())
                .unwrap();
            archive.begin().unwrap();
            archive
                .publish(LineageId::generate(), "m2", "m2", PortalType::Module, Version::major(1), t0())
                .unwrap();
            archive.rollback().unwrap();
        }

        let archive = Archive::open(temp_dir.path()).unwrap();
        assert_eq!(archive.document_count(), 1);
    }

    #[test]
    fn test_latest_revision_for_legacy_id() {
        let mut s = sample();
        let lineage = s.archive.document(s.m1).unwrap().lineage;
        let m1_v2 = s
            .archive
            .publish(lineage, "m1", "m1", PortalType::Module, Version::major(2), t0() + Duration::days(1))
            .unwrap();
        assert_eq!(s.archive.latest_revision_for("m1").unwrap(), Some(m1_v2));
        assert_eq!(s.archive.latest_revision_for("m404").unwrap(), None);
    }
}
