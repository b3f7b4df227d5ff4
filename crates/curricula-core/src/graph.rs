//! # Graph Model
//!
//! The immutable, per-subject curriculum graph.
//!
//! All data structures use `BTreeMap` for deterministic ordering. A `Graph`
//! is only mutated by [`crate::GraphBuilder`]; once built it is shared
//! read-only (usually as `Arc<Graph>`) and every query is a pure function
//! over it.

use crate::primitives::PATH_SEPARATOR;
use crate::{Completed, EdgeKind, Grade, NodeId, NodeKind, NodeType, TaxonomyNode};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A subject's taxonomy as a node/edge graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Subject name; first segment of every path.
    subject: String,

    /// Node storage: NodeId -> TaxonomyNode
    nodes: BTreeMap<NodeId, TaxonomyNode>,

    /// Top-level nodes in authored order.
    roots: Vec<NodeId>,

    /// Containment children in authored order.
    children: BTreeMap<NodeId, Vec<NodeId>>,

    /// Adjacency list: from_node -> (to_node -> kind)
    edges: BTreeMap<NodeId, BTreeMap<NodeId, EdgeKind>>,

    /// Reverse adjacency: to_node -> (from_node -> kind)
    reverse: BTreeMap<NodeId, BTreeMap<NodeId, EdgeKind>>,

    /// Rendered path -> NodeId
    path_index: BTreeMap<String, NodeId>,

    /// Next available NodeId
    next_node_id: u32,
}

/// Fields for a node about to be inserted.
#[derive(Debug, Clone)]
pub(crate) struct NewNode {
    pub key: String,
    pub label: String,
    pub kind: NodeKind,
    pub grade_level: Grade,
    pub node_type: NodeType,
    pub description: String,
    pub parent: Option<NodeId>,
    pub sequence_index: Option<usize>,
}

impl Graph {
    /// Create an empty graph for a subject.
    #[must_use]
    pub fn empty(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    // =========================================================================
    // BUILD-TIME MUTATION (crate-private)
    // =========================================================================

    /// Insert a node and, when it has a parent, its containment edge.
    pub(crate) fn insert_node(&mut self, new: NewNode) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        let parent = new.parent;

        self.nodes.insert(
            id,
            TaxonomyNode {
                id,
                key: new.key,
                label: new.label,
                kind: new.kind,
                grade_level: new.grade_level,
                node_type: new.node_type,
                description: new.description,
                parent,
                sequence_index: new.sequence_index,
            },
        );

        match parent {
            Some(parent) => {
                self.children.entry(parent).or_default().push(id);
                self.insert_edge(parent, id, EdgeKind::Containment);
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Insert a directed edge. Dangling endpoints are silently ignored.
    pub(crate) fn insert_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        if from == to {
            return false;
        }
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return false;
        }
        self.edges.entry(from).or_default().insert(to, kind);
        self.reverse.entry(to).or_default().insert(from, kind);
        true
    }

    pub(crate) fn set_grade(&mut self, id: NodeId, grade: Grade) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.grade_level = grade;
        }
    }

    /// Rebuild the path index. Returns paths that collided with an earlier node.
    pub(crate) fn index_paths(&mut self) -> Vec<String> {
        let mut collisions = Vec::new();
        let mut index = BTreeMap::new();
        for id in self.nodes.keys() {
            if let Some(path) = self.path(*id) {
                if index.contains_key(&path) {
                    collisions.push(path);
                } else {
                    index.insert(path, *id);
                }
            }
        }
        self.path_index = index;
        collisions
    }

    // =========================================================================
    // NODE ACCESS
    // =========================================================================

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TaxonomyNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes in authored pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes.values()
    }

    /// All concept nodes in authored pre-order.
    pub fn concepts(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes.values().filter(|n| n.is_concept())
    }

    /// Top-level nodes in authored order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Containment children in authored order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// The node together with its siblings, in authored order.
    ///
    /// For a root this is the list of roots. Unknown ids yield an empty slice.
    #[must_use]
    pub fn sibling_group(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(&id) {
            Some(node) => match node.parent {
                Some(parent) => self.children(parent),
                None => &self.roots,
            },
            None => &[],
        }
    }

    /// Walk the parent chain upward, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Every node below `id` in authored pre-order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // EDGE ACCESS
    // =========================================================================

    /// Outgoing edges in ascending target order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, EdgeKind)> + '_ {
        self.edges
            .get(&id)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(k, v)| (*k, *v)))
    }

    /// Incoming edges in ascending source order.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, EdgeKind)> + '_ {
        self.reverse
            .get(&id)
            .into_iter()
            .flat_map(|sources| sources.iter().map(|(k, v)| (*k, *v)))
    }

    #[must_use]
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<EdgeKind> {
        self.edges.get(&from)?.get(&to).copied()
    }

    /// True when `to` is reachable from `from` along prerequisite edges.
    #[must_use]
    pub fn prerequisite_reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for (next, kind) in self.successors(current) {
                if kind == EdgeKind::Prerequisite && !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    // =========================================================================
    // PATHS
    // =========================================================================

    /// Human-readable path: `Subject/key/.../key`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        let mut segments: Vec<&str> = vec![node.key.as_str()];
        for ancestor in self.ancestors(id) {
            if let Some(a) = self.nodes.get(&ancestor) {
                segments.push(a.key.as_str());
            }
        }
        segments.push(self.subject.as_str());
        segments.reverse();
        Some(segments.join(PATH_SEPARATOR))
    }

    /// Look up a node by its rendered path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        self.path_index.get(path).copied()
    }

    /// Build a [`Completed`] from caller-supplied paths, keeping unknown entries.
    pub fn completed_from_paths<I, S>(&self, paths: I) -> Completed
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut completed = Completed::new();
        for path in paths {
            match self.resolve(path.as_ref()) {
                Some(id) => completed.push(id),
                None => completed.push_unknown(),
            }
        }
        completed
    }
}

// =============================================================================
// TESTS
// =============================================================================
