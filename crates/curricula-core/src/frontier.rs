//! # Frontier Resolver
//!
//! Which concepts are learnable right now.
//!
//! A concept is on the frontier when it is not completed and every
//! concept-type predecessor is. Containment predecessors never gate a
//! concept: entering a topic is not a prerequisite of its contents.

use crate::{Completed, Grade, Graph, NodeId, TaxonomyNode};

/// Computes the learnable frontier of a graph.
pub struct Frontier;

impl Frontier {
    /// Every concept not in `completed` whose concept predecessors all are.
    ///
    /// With a target grade the result is ordered by (distance to target,
    /// grade, path); otherwise by (grade, path). The node id breaks any
    /// remaining tie so the order is total.
    pub fn next_learnable<'g>(
        graph: &'g Graph,
        completed: &Completed,
        target: Option<Grade>,
    ) -> Vec<&'g TaxonomyNode> {
        let candidates: Vec<&TaxonomyNode> = graph
            .concepts()
            .filter(|c| !completed.contains(c.id))
            .filter(|c| Self::is_unlocked(graph, completed, c.id))
            .collect();

        let mut keyed: Vec<_> = candidates
            .into_iter()
            .map(|node| {
                let distance = target.map_or(0, |t| node.grade_level.distance(t));
                let path = graph.path(node.id).unwrap_or_default();
                ((distance, node.grade_level, path, node.id), node)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, node)| node).collect()
    }

    /// True when every concept predecessor of `id` is completed.
    ///
    /// Unknown ids are never unlocked.
    #[must_use]
    pub fn is_unlocked(graph: &Graph, completed: &Completed, id: NodeId) -> bool {
        graph.contains_node(id)
            && graph
                .predecessors(id)
                .filter(|(from, _)| graph.node(*from).is_some_and(|n| n.is_concept()))
                .all(|(from, _)| completed.contains(from))
    }

    /// True when `id` is a concept on the frontier.
    #[must_use]
    pub fn is_learnable(graph: &Graph, completed: &Completed, id: NodeId) -> bool {
        graph.node(id).is_some_and(|n| n.is_concept())
            && !completed.contains(id)
            && Self::is_unlocked(graph, completed, id)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphBuilder, TaxonomyLoader};

    fn units() -> Graph {
        let doc = TaxonomyLoader::parse_str(
            r#"{ "subject": "Math", "taxonomy": {
                "Measurement": { "concepts": [
                    { "label": "Feet", "grade_level": 3 },
                    { "label": "Pounds", "grade_level": 3 },
                    { "label": "Liters", "grade_level": 4 },
                    { "label": "Standard_to_Metric", "grade_level": 5 }
                ] },
                "Geometry": { "concepts": [
                    { "label": "Shapes", "grade_level": 1 },
                    { "label": "Angles", "grade_level": 4 },
                    { "label": "Tessellations", "grade_level": 2, "type": "enrichment" }
                ] }
            } }"#,
        )
        .expect("load");
        GraphBuilder::build(&doc)
    }

    fn labels(nodes: &[&TaxonomyNode]) -> Vec<String> {
        nodes.iter().map(|n| n.label.clone()).collect()
    }

    #[test]
    fn heads_of_lists_and_optional_concepts_start_unlocked() {
        let graph = units();
        let frontier = Frontier::next_learnable(&graph, &Completed::new(), None);
        assert_eq!(labels(&frontier), vec!["Shapes", "Tessellations", "Feet"]);
    }

    #[test]
    fn completing_a_chain_unlocks_its_tail() {
        let graph = units();
        let completed = graph.completed_from_paths([
            "Math/Measurement/Feet",
            "Math/Measurement/Pounds",
            "Math/Measurement/Liters",
        ]);
        let frontier = Frontier::next_learnable(&graph, &completed, None);
        assert!(labels(&frontier).contains(&"Standard_to_Metric".to_string()));
        assert!(!labels(&frontier).contains(&"Feet".to_string()));
    }

    #[test]
    fn target_grade_orders_by_distance_then_grade() {
        let graph = units();
        let completed = graph.completed_from_paths(["Math/Geometry/Shapes"]);
        let frontier = Frontier::next_learnable(&graph, &completed, Some(Grade(3)));
        // Feet is exact; the distance-1 tie goes to the lower grade.
        assert_eq!(labels(&frontier), vec!["Feet", "Tessellations", "Angles"]);
    }

    #[test]
    fn predecessors_of_candidates_are_completed() {
        let graph = units();
        let completed = graph.completed_from_paths(["Math/Measurement/Feet"]);
        for node in Frontier::next_learnable(&graph, &completed, None) {
            for (from, _) in graph.predecessors(node.id) {
                if graph.node(from).is_some_and(|n| n.is_concept()) {
                    assert!(completed.contains(from));
                }
            }
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let graph = units();
        let completed = graph.completed_from_paths(["Math/Measurement/Feet"]);
        let first = Frontier::next_learnable(&graph, &completed, Some(Grade(4)));
        let second = Frontier::next_learnable(&graph, &completed, Some(Grade(4)));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_graph_has_empty_frontier() {
        let graph = Graph::empty("Nothing");
        assert!(Frontier::next_learnable(&graph, &Completed::new(), None).is_empty());
        assert!(!Frontier::is_unlocked(&graph, &Completed::new(), NodeId(0)));
    }

    #[test]
    fn containers_are_not_learnable() {
        let graph = units();
        let topic = graph.resolve("Math/Measurement").expect("topic");
        assert!(Frontier::is_unlocked(&graph, &Completed::new(), topic));
        assert!(!Frontier::is_learnable(&graph, &Completed::new(), topic));
    }
}
