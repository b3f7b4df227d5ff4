//! # Prerequisite Resolver
//!
//! Immediate and transitive concept prerequisites, for remediation.
//!
//! Only concept-type predecessors count; the containing topic of a concept
//! is never one of its prerequisites.

use crate::primitives::MAX_TRAVERSAL_DEPTH;
use crate::{Graph, NodeId};
use std::collections::{BTreeSet, VecDeque};

/// A transitive prerequisite and its distance from the queried concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerequisiteStep {
    pub id: NodeId,
    /// 1 for a direct prerequisite.
    pub depth: usize,
}

pub struct Prerequisites;

impl Prerequisites {
    /// Immediate concept predecessors in ascending id order.
    ///
    /// Unknown ids yield an empty list.
    pub fn of(graph: &Graph, id: NodeId) -> Vec<NodeId> {
        graph
            .predecessors(id)
            .map(|(from, _)| from)
            .filter(|from| graph.node(*from).is_some_and(|n| n.is_concept()))
            .collect()
    }

    /// All transitive concept prerequisites, breadth-first.
    ///
    /// `max_depth` is clamped to [`MAX_TRAVERSAL_DEPTH`]. Each prerequisite
    /// appears once, at the shallowest depth it is reached.
    pub fn chain(graph: &Graph, id: NodeId, max_depth: usize) -> Vec<PrerequisiteStep> {
        let max_depth = max_depth.min(MAX_TRAVERSAL_DEPTH);
        let mut out = Vec::new();
        let mut visited = BTreeSet::from([id]);
        let mut queue = VecDeque::from([(id, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let next_depth = depth.saturating_add(1);
            for from in Self::of(graph, current) {
                if visited.insert(from) {
                    out.push(PrerequisiteStep {
                        id: from,
                        depth: next_depth,
                    });
                    queue.push_back((from, next_depth));
                }
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
