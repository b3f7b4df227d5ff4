//! # Graph Builder
//!
//! Converts a typed [`TaxonomyDocument`] into an immutable [`Graph`].
//!
//! - Containment edges for every parent → child link
//! - Sequential prerequisite edges between consecutive core concepts of one
//!   authored list (never for recommended/enrichment, never across lists)
//! - Missing grades and types are inherited from the nearest ancestor
//! - A post-order pass then sets every container's grade to the minimum
//!   grade of its concept descendants; this bubbled-up value is the one all
//!   grade filtering uses
//! - Malformed input is skipped with a warning; building never fails

use crate::graph::NewNode;
use crate::primitives::DEFAULT_GRADE;
use crate::taxonomy::{
    ConceptEntry, EntryShape, FlatEntry, NodeAttrs, TaxonomyBody, TaxonomyDocument,
    TaxonomyEntry,
};
use crate::{EdgeKind, Grade, Graph, NodeId, NodeKind, NodeType};
use std::collections::BTreeMap;

/// Values a node falls back to when it declares none.
#[derive(Debug, Clone, Copy)]
struct Inherited {
    grade: Grade,
    node_type: NodeType,
}

impl Inherited {
    const ROOT: Inherited = Inherited {
        grade: DEFAULT_GRADE,
        node_type: NodeType::Core,
    };

    fn apply(self, attrs: &NodeAttrs) -> Inherited {
        Inherited {
            grade: attrs.grade_level.unwrap_or(self.grade),
            node_type: attrs.node_type.unwrap_or(self.node_type),
        }
    }
}

/// Builds subject graphs from taxonomy documents.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build the graph for one subject document.
    pub fn build(doc: &TaxonomyDocument) -> Graph {
        let mut graph = Graph::empty(doc.subject.as_str());
        let mut skipped = 0usize;

        match &doc.body {
            TaxonomyBody::Nested(entries) => {
                for entry in entries {
                    build_entry(&mut graph, entry, None, 0, Inherited::ROOT, &mut skipped);
                }
            }
            TaxonomyBody::Flat(nodes) => build_flat(&mut graph, nodes, &mut skipped),
        }

        bubble_up_grades(&mut graph);

        for path in graph.index_paths() {
            tracing::warn!(
                subject = %doc.subject,
                path = %path,
                "duplicate node path; only the first node resolves by path"
            );
        }

        tracing::debug!(
            subject = %doc.subject,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped,
            "built curriculum graph"
        );
        graph
    }
}

// =============================================================================
// NESTED TAXONOMY
// =============================================================================

fn build_entry(
    graph: &mut Graph,
    entry: &TaxonomyEntry,
    parent: Option<NodeId>,
    depth: usize,
    inherited: Inherited,
    skipped: &mut usize,
) {
    match &entry.shape {
        EntryShape::Malformed { reason } => {
            tracing::warn!(
                subject = %graph.subject(),
                node = %entry.key,
                reason = %reason,
                "skipping malformed taxonomy node"
            );
            *skipped = skipped.saturating_add(1);
        }
        EntryShape::Container { attrs, children } => {
            let own = inherited.apply(attrs);
            let id = insert_container(graph, entry, attrs, parent, depth, own);
            for child in children {
                build_entry(graph, child, Some(id), depth.saturating_add(1), own, skipped);
            }
        }
        EntryShape::ConceptList { attrs, concepts } => {
            let own = inherited.apply(attrs);
            let holder = insert_container(graph, entry, attrs, parent, depth, own);
            build_concept_list(graph, holder, concepts, own, skipped);
        }
    }
}

fn insert_container(
    graph: &mut Graph,
    entry: &TaxonomyEntry,
    attrs: &NodeAttrs,
    parent: Option<NodeId>,
    depth: usize,
    own: Inherited,
) -> NodeId {
    graph.insert_node(NewNode {
        key: entry.key.clone(),
        label: attrs.label.clone().unwrap_or_else(|| entry.key.clone()),
        kind: NodeKind::container_at(depth),
        grade_level: own.grade,
        node_type: own.node_type,
        description: attrs.description.clone(),
        parent,
        sequence_index: None,
    })
}

fn build_concept_list(
    graph: &mut Graph,
    holder: NodeId,
    concepts: &[ConceptEntry],
    own: Inherited,
    skipped: &mut usize,
) {
    let mut sequence_index = 0usize;
    let mut previous_core: Option<NodeId> = None;

    for concept in concepts {
        let raw = match concept {
            ConceptEntry::Concept(raw) => raw,
            ConceptEntry::Malformed { reason } => {
                tracing::warn!(
                    subject = %graph.subject(),
                    holder = ?holder,
                    reason = %reason,
                    "skipping malformed concept"
                );
                *skipped = skipped.saturating_add(1);
                continue;
            }
        };

        let node_type = raw.node_type.unwrap_or(own.node_type);
        let id = graph.insert_node(NewNode {
            key: raw.label.clone(),
            label: raw.label.clone(),
            kind: NodeKind::Concept,
            grade_level: raw.grade_level.unwrap_or(own.grade),
            node_type,
            description: raw.description.clone(),
            parent: Some(holder),
            sequence_index: Some(sequence_index),
        });
        sequence_index = sequence_index.saturating_add(1);

        if node_type.is_core() {
            if let Some(previous) = previous_core {
                graph.insert_edge(previous, id, EdgeKind::Prerequisite);
            }
            previous_core = Some(id);
        }
    }
}

// =============================================================================
// LEGACY FLAT LIST
// =============================================================================

fn build_flat(graph: &mut Graph, entries: &[FlatEntry], skipped: &mut usize) {
    let mut by_key: BTreeMap<&str, NodeId> = BTreeMap::new();
    let mut accepted = Vec::new();

    for entry in entries {
        let node = match entry {
            FlatEntry::Node(node) => node,
            FlatEntry::Malformed { reason } => {
                tracing::warn!(
                    subject = %graph.subject(),
                    reason = %reason,
                    "skipping malformed node"
                );
                *skipped = skipped.saturating_add(1);
                continue;
            }
        };
        if by_key.contains_key(node.id.as_str()) {
            tracing::warn!(
                subject = %graph.subject(),
                node = %node.id,
                "skipping duplicate node id"
            );
            *skipped = skipped.saturating_add(1);
            continue;
        }

        let own = Inherited::ROOT.apply(&node.attrs);
        let id = graph.insert_node(NewNode {
            key: node.id.clone(),
            label: node.attrs.label.clone().unwrap_or_else(|| node.id.clone()),
            kind: NodeKind::Concept,
            grade_level: own.grade,
            node_type: own.node_type,
            description: node.attrs.description.clone(),
            parent: None,
            sequence_index: None,
        });
        by_key.insert(node.id.as_str(), id);
        accepted.push((id, node));
    }

    for (id, node) in accepted {
        for prerequisite in &node.prerequisites {
            let Some(&from) = by_key.get(prerequisite.as_str()) else {
                tracing::warn!(
                    subject = %graph.subject(),
                    node = %node.id,
                    prerequisite = %prerequisite,
                    "unknown prerequisite; edge skipped"
                );
                continue;
            };
            if graph.prerequisite_reaches(id, from) {
                tracing::warn!(
                    subject = %graph.subject(),
                    node = %node.id,
                    prerequisite = %prerequisite,
                    "prerequisite would create a cycle; edge skipped"
                );
                continue;
            }
            graph.insert_edge(from, id, EdgeKind::Prerequisite);
        }
    }
}

// =============================================================================
// GRADE BUBBLE-UP
// =============================================================================

/// Set each container's grade to the minimum grade among its concept
/// descendants. Containers with no concepts keep their inherited grade.
fn bubble_up_grades(graph: &mut Graph) {
    let mut updates = Vec::new();
    for &root in graph.roots() {
        min_concept_grade(graph, root, &mut updates);
    }
    for (id, grade) in updates {
        graph.set_grade(id, grade);
    }
}

fn min_concept_grade(
    graph: &Graph,
    id: NodeId,
    updates: &mut Vec<(NodeId, Grade)>,
) -> Option<Grade> {
    let node = graph.node(id)?;
    if node.is_concept() {
        return Some(node.grade_level);
    }

    let mut minimum: Option<Grade> = None;
    for &child in graph.children(id) {
        if let Some(grade) = min_concept_grade(graph, child, updates) {
            minimum = Some(minimum.map_or(grade, |m| m.min(grade)));
        }
    }

    if let Some(grade) = minimum {
        if grade != node.grade_level {
            updates.push((id, grade));
        }
    }
    minimum
}

// =============================================================================
// TESTS
// =============================================================================
