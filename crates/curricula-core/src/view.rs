//! # Map Window
//!
//! A bounded neighbourhood of the graph, annotated with learner status,
//! for rendering a curriculum map around where the learner is.

use crate::primitives::MAX_WINDOW_SIZE;
use crate::{Completed, Frontier, Grade, Graph, NodeId, NodeKind, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Learner status of a node in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Completed,
    Current,
    Available,
    Locked,
}

/// One node of a map window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub path: String,
    pub label: String,
    pub kind: NodeKind,
    pub grade_level: Grade,
    pub node_type: NodeType,
    pub parent: Option<String>,
    pub status: NodeStatus,
}

/// Breadth-first window around `focus`, over edges in both directions.
///
/// `focus` falls back to `current`, then to the first root. At most
/// `limit` nodes are returned (never more than [`MAX_WINDOW_SIZE`]).
pub fn window(
    graph: &Graph,
    completed: &Completed,
    current: Option<NodeId>,
    focus: Option<NodeId>,
    limit: usize,
) -> Vec<NodeView> {
    let limit = limit.min(MAX_WINDOW_SIZE);
    let known = |id: &NodeId| graph.contains_node(*id);
    let Some(start) = focus
        .filter(known)
        .or_else(|| current.filter(known))
        .or_else(|| graph.roots().first().copied())
    else {
        return Vec::new();
    };

    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut out = Vec::new();

    while let Some(id) = queue.pop_front() {
        if out.len() >= limit {
            break;
        }
        if let Some(view) = node_view(graph, completed, current, id) {
            out.push(view);
        }
        let neighbours: BTreeSet<NodeId> = graph
            .successors(id)
            .chain(graph.predecessors(id))
            .map(|(n, _)| n)
            .collect();
        for next in neighbours {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    out
}

/// Status of one node for a learner.
pub fn status(
    graph: &Graph,
    completed: &Completed,
    current: Option<NodeId>,
    id: NodeId,
) -> NodeStatus {
    if current == Some(id) {
        NodeStatus::Current
    } else if completed.contains(id) {
        NodeStatus::Completed
    } else if is_available(graph, completed, id) {
        NodeStatus::Available
    } else {
        NodeStatus::Locked
    }
}

/// A concept on the frontier, or a container with one below it.
fn is_available(graph: &Graph, completed: &Completed, id: NodeId) -> bool {
    match graph.node(id) {
        Some(node) if node.is_concept() => Frontier::is_learnable(graph, completed, id),
        Some(_) => graph
            .descendants(id)
            .into_iter()
            .any(|d| Frontier::is_learnable(graph, completed, d)),
        None => false,
    }
}

fn node_view(
    graph: &Graph,
    completed: &Completed,
    current: Option<NodeId>,
    id: NodeId,
) -> Option<NodeView> {
    let node = graph.node(id)?;
    Some(NodeView {
        id,
        path: graph.path(id)?,
        label: node.label.clone(),
        kind: node.kind,
        grade_level: node.grade_level,
        node_type: node.node_type,
        parent: node.parent.and_then(|p| graph.path(p)),
        status: status(graph, completed, current, id),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::DEFAULT_WINDOW_SIZE;
    use crate::{GraphBuilder, TaxonomyLoader};

    fn graph() -> Graph {
        let doc = TaxonomyLoader::parse_str(
            r#"{ "subject": "Math", "taxonomy": {
                "Counting": { "concepts": [ "One", "Two", "Three" ] },
                "Shapes": { "concepts": [ "Circle" ] }
            } }"#,
        )
        .expect("load");
        GraphBuilder::build(&doc)
    }

    fn status_of(views: &[NodeView], path: &str) -> Option<NodeStatus> {
        views.iter().find(|v| v.path == path).map(|v| v.status)
    }

    #[test]
    fn statuses_reflect_progress() {
        let graph = graph();
        let completed = graph.completed_from_paths(["Math/Counting/One"]);
        let current = graph.resolve("Math/Counting/Two");
        let views = window(&graph, &completed, current, None, DEFAULT_WINDOW_SIZE);

        assert_eq!(status_of(&views, "Math/Counting/One"), Some(NodeStatus::Completed));
        assert_eq!(status_of(&views, "Math/Counting/Two"), Some(NodeStatus::Current));
        assert_eq!(status_of(&views, "Math/Counting/Three"), Some(NodeStatus::Locked));
        assert_eq!(status_of(&views, "Math/Counting"), Some(NodeStatus::Available));
    }

    #[test]
    fn window_starts_at_focus_and_respects_limit() {
        let graph = graph();
        let focus = graph.resolve("Math/Shapes");
        let views = window(&graph, &Completed::new(), None, focus, 2);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].path, "Math/Shapes");
        assert_eq!(views[1].path, "Math/Shapes/Circle");
        assert_eq!(views[1].parent.as_deref(), Some("Math/Shapes"));
        assert_eq!(views[1].status, NodeStatus::Available);
    }

    #[test]
    fn window_defaults_to_first_root() {
        let graph = graph();
        let views = window(&graph, &Completed::new(), None, Some(NodeId(999)), 1);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].path, "Math/Counting");
    }

    #[test]
    fn empty_graph_has_empty_window() {
        let graph = Graph::empty("Art");
        assert!(window(&graph, &Completed::new(), None, None, 10).is_empty());
    }
}
