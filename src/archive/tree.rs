//! Collection trees
//!
//! A tree belongs to exactly one collection revision: its root node
//! references that revision and every other node references a module or
//! sub-collection revision. Trees are never edited. A new collection
//! revision gets a fresh copy of the old shape with some document
//! references substituted.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::types::RevisionId;

/// Old revision id → replacing revision id.
pub type IdMap = BTreeMap<RevisionId, RevisionId>;

/// One persisted tree node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub node_id: u64,
    pub parent: Option<u64>,
    pub document: RevisionId,
    pub title: Option<String>,
    pub child_order: u32,
}

/// Nested form of a tree, used for fixture import and for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub document: RevisionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSpec>,
}

impl TreeSpec {
    pub fn leaf(document: RevisionId) -> Self {
        Self {
            document,
            title: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(document: RevisionId, children: Vec<TreeSpec>) -> Self {
        Self {
            document,
            title: None,
            children,
        }
    }

    /// Flattens into nodes, allocating node ids from `next_node_id`.
    pub fn flatten(&self, next_node_id: &mut u64) -> Vec<TreeNode> {
        let mut nodes = Vec::new();
        self.flatten_into(None, 0, next_node_id, &mut nodes);
        nodes
    }

    fn flatten_into(
        &self,
        parent: Option<u64>,
        child_order: u32,
        next_node_id: &mut u64,
        out: &mut Vec<TreeNode>,
    ) {
        let node_id = *next_node_id;
        *next_node_id += 1;
        out.push(TreeNode {
            node_id,
            parent,
            document: self.document,
            title: self.title.clone(),
            child_order,
        });
        for (order, child) in self.children.iter().enumerate() {
            child.flatten_into(Some(node_id), order as u32, next_node_id, out);
        }
    }
}

/// A tree in preorder: root first, siblings by child order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionTree {
    nodes: Vec<TreeNode>,
}

impl CollectionTree {
    /// Assembles the tree hanging off `root` from a pool of nodes.
    ///
    /// `children` maps a parent node id to its child nodes. Nodes already
    /// on the path from the root are not revisited.
    pub fn assemble(root: &TreeNode, children: &HashMap<u64, Vec<&TreeNode>>) -> Self {
        let mut nodes = Vec::new();
        let mut path = Vec::new();
        Self::visit(root, children, &mut path, &mut nodes);
        Self { nodes }
    }

    fn visit(
        node: &TreeNode,
        children: &HashMap<u64, Vec<&TreeNode>>,
        path: &mut Vec<u64>,
        out: &mut Vec<TreeNode>,
    ) {
        if path.contains(&node.node_id) {
            return;
        }
        out.push(node.clone());
        path.push(node.node_id);
        if let Some(kids) = children.get(&node.node_id) {
            let mut kids = kids.clone();
            kids.sort_by_key(|n| (n.child_order, n.node_id));
            for kid in kids {
                Self::visit(kid, children, path, out);
            }
        }
        path.pop();
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Referenced document revisions in preorder, root included.
    pub fn documents(&self) -> Vec<RevisionId> {
        self.nodes.iter().map(|n| n.document).collect()
    }

    /// Copies this tree with document references substituted.
    ///
    /// References absent from `id_map` are kept. Fresh node ids are taken
    /// from `next_node_id` and parent links are remapped to them, so the
    /// copy has the same shape, order and titles as the original.
    pub fn substitute(&self, id_map: &IdMap, next_node_id: &mut u64) -> Vec<TreeNode> {
        let mut remapped: HashMap<u64, u64> = HashMap::with_capacity(self.nodes.len());
        let mut copy = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let node_id = *next_node_id;
            *next_node_id += 1;
            remapped.insert(node.node_id, node_id);

            copy.push(TreeNode {
                node_id,
                parent: node.parent.and_then(|p| remapped.get(&p).copied()),
                document: id_map.get(&node.document).copied().unwrap_or(node.document),
                title: node.title.clone(),
                child_order: node.child_order,
            });
        }

        copy
    }

    /// Converts back to the nested form.
    pub fn to_spec(&self) -> TreeSpec {
        let mut by_parent: HashMap<u64, Vec<&TreeNode>> = HashMap::new();
        for node in &self.nodes[1..] {
            if let Some(parent) = node.parent {
                by_parent.entry(parent).or_default().push(node);
            }
        }

        fn build(node: &TreeNode, by_parent: &HashMap<u64, Vec<&TreeNode>>) -> TreeSpec {
            TreeSpec {
                document: node.document,
                title: node.title.clone(),
                children: by_parent
                    .get(&node.node_id)
                    .map(|kids| kids.iter().map(|k| build(k, by_parent)).collect())
                    .unwrap_or_default(),
            }
        }

        build(self.root(), &by_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(n: u64) -> RevisionId {
        RevisionId::new(n)
    }

    fn sample_tree() -> CollectionTree {
        let spec = TreeSpec::with_children(
            rev(10),
            vec![
                TreeSpec::leaf(rev(1)),
                TreeSpec::with_children(rev(20), vec![TreeSpec::leaf(rev(2))]),
                TreeSpec::leaf(rev(3)),
            ],
        );
        let mut next = 1;
        let nodes = spec.flatten(&mut next);
        let mut children: HashMap<u64, Vec<&TreeNode>> = HashMap::new();
        for node in &nodes {
            if let Some(parent) = node.parent {
                children.entry(parent).or_default().push(node);
            }
        }
        CollectionTree::assemble(&nodes[0], &children)
    }

    #[test]
    fn test_assemble_is_preorder() {
        let tree = sample_tree();
        assert_eq!(
            tree.documents(),
            vec![rev(10), rev(1), rev(20), rev(2), rev(3)]
        );
        assert_eq!(tree.root().parent, None);
    }

    #[test]
    fn test_substitute_keeps_shape() {
        let tree = sample_tree();
        let mut id_map = IdMap::new();
        id_map.insert(rev(10), rev(11));
        id_map.insert(rev(2), rev(7));

        let mut next = 100;
        let copy = tree.substitute(&id_map, &mut next);

        assert_eq!(copy.len(), tree.nodes().len());
        let docs: Vec<_> = copy.iter().map(|n| n.document).collect();
        assert_eq!(docs, vec![rev(11), rev(1), rev(20), rev(7), rev(3)]);

        // parent links point into the copy
        assert_eq!(copy[0].parent, None);
        assert_eq!(copy[3].parent, Some(copy[2].node_id));
        assert!(copy.iter().all(|n| n.node_id >= 100));
        assert_eq!(next, 105);
    }

    #[test]
    fn test_to_spec_roundtrips_shape() {
        let tree = sample_tree();
        let spec = tree.to_spec();
        assert_eq!(spec.document, rev(10));
        assert_eq!(spec.children.len(), 3);
        assert_eq!(spec.children[1].children[0].document, rev(2));
    }
}
