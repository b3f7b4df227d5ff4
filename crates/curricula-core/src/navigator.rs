//! # Node Navigator
//!
//! "What shelf item comes next" after the most recently completed node.
//!
//! Unlike the frontier, navigation follows the authored hierarchy rather
//! than prerequisite edges:
//!
//! 1. Inside a concept list, the next concept is the only option (strict
//!    linear progression), provided its grade is within reach.
//! 2. Once a list is exhausted, every open sibling container is offered.
//!    Several results are a branch choice for the caller; the navigator
//!    never picks one.
//! 3. With no open siblings, the walk climbs one level and repeats, ending
//!    at the subject.

use crate::{Completed, Grade, Graph, NodeId};

pub struct Navigator;

impl Navigator {
    /// Next options given the caller's ordered completed-set.
    ///
    /// An empty completed-set is a cold start and returns the entry points.
    /// An anchor that does not resolve returns nothing.
    pub fn next_options(graph: &Graph, completed: &Completed, grade: Grade) -> Vec<NodeId> {
        if completed.is_empty() {
            return Self::entry_points(graph, grade);
        }
        let Some(anchor) = completed.anchor().filter(|id| graph.contains_node(*id)) else {
            tracing::debug!(subject = %graph.subject(), "navigation anchor unknown");
            return Vec::new();
        };

        if let Some(next) = Self::next_in_sequence(graph, anchor, grade) {
            return vec![next];
        }

        let mut current = Some(anchor);
        while let Some(id) = current {
            let options = Self::open_siblings(graph, completed, id, grade);
            if !options.is_empty() {
                return options;
            }
            current = graph.parent(id);
        }
        Vec::new()
    }

    /// Root topics within reach of `grade`, in authored order.
    pub fn entry_points(graph: &Graph, grade: Grade) -> Vec<NodeId> {
        graph
            .roots()
            .iter()
            .copied()
            .filter(|id| graph.node(*id).is_some_and(|n| n.grade_level <= grade))
            .collect()
    }

    /// The concept following `id` in its list, if within reach of `grade`.
    pub fn next_in_sequence(graph: &Graph, id: NodeId, grade: Grade) -> Option<NodeId> {
        let index = graph.node(id)?.sequence_index?;
        let wanted = index.checked_add(1)?;
        let next = graph.sibling_group(id).iter().copied().find(|sibling| {
            graph.node(*sibling).and_then(|n| n.sequence_index) == Some(wanted)
        })?;
        graph
            .node(next)
            .filter(|n| n.grade_level <= grade)
            .map(|n| n.id)
    }

    /// Sibling containers of `id` that are open: not `id` itself, not
    /// completed, and within reach of `grade`.
    ///
    /// Only a container's own id counts as completing it. A sibling whose
    /// concepts are all completed is still offered; callers that record
    /// concepts only must filter finished branches themselves.
    pub fn open_siblings(
        graph: &Graph,
        completed: &Completed,
        id: NodeId,
        grade: Grade,
    ) -> Vec<NodeId> {
        graph
            .sibling_group(id)
            .iter()
            .copied()
            .filter(|sibling| *sibling != id && !completed.contains(*sibling))
            .filter(|sibling| {
                graph
                    .node(*sibling)
                    .is_some_and(|n| n.kind.is_container() && n.grade_level <= grade)
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphBuilder, TaxonomyLoader};

    fn science() -> Graph {
        let doc = TaxonomyLoader::parse_str(
            r#"{ "subject": "Science", "taxonomy": {
                "Physical_Science": { "subtopics": {
                    "Matter": { "subtopics": {
                        "Structure_Elem": { "concepts": [
                            { "label": "Solids", "grade_level": 1 },
                            { "label": "Liquids", "grade_level": 1 },
                            { "label": "Gases", "grade_level": 2 }
                        ] },
                        "Chemical_Reactions": { "concepts": [ { "label": "Rusting", "grade_level": 3 } ] },
                        "Mixtures": { "concepts": [ { "label": "Solutions", "grade_level": 2 } ] },
                        "Nuclear": { "concepts": [ { "label": "Fission", "grade_level": 11 } ] }
                    } },
                    "Energy": { "concepts": [ { "label": "Heat", "grade_level": 2 } ] }
                } },
                "Life_Science": { "concepts": [ { "label": "Cells", "grade_level": 4 } ] },
                "Earth_Science": { "concepts": [ { "label": "Rocks", "grade_level": 1 } ] }
            } }"#,
        )
        .expect("load");
        GraphBuilder::build(&doc)
    }

    fn paths(graph: &Graph, ids: &[NodeId]) -> Vec<String> {
        ids.iter().filter_map(|id| graph.path(*id)).collect()
    }

    #[test]
    fn cold_start_offers_roots_within_grade() {
        let graph = science();
        let options = Navigator::next_options(&graph, &Completed::new(), Grade(2));
        assert_eq!(
            paths(&graph, &options),
            vec!["Science/Physical_Science", "Science/Earth_Science"]
        );
    }

    #[test]
    fn next_concept_in_list_is_the_only_option() {
        let graph = science();
        let completed = graph
            .completed_from_paths(["Science/Physical_Science/Matter/Structure_Elem/Solids"]);
        let options = Navigator::next_options(&graph, &completed, Grade(5));
        assert_eq!(
            paths(&graph, &options),
            vec!["Science/Physical_Science/Matter/Structure_Elem/Liquids"]
        );
    }

    #[test]
    fn exhausted_list_branches_to_sibling_containers() {
        let graph = science();
        let completed = graph.completed_from_paths([
            "Science/Physical_Science/Matter/Structure_Elem/Solids",
            "Science/Physical_Science/Matter/Structure_Elem/Liquids",
            "Science/Physical_Science/Matter/Structure_Elem/Gases",
        ]);
        let options = Navigator::next_options(&graph, &completed, Grade(5));
        assert_eq!(
            paths(&graph, &options),
            vec![
                "Science/Physical_Science/Matter/Chemical_Reactions",
                "Science/Physical_Science/Matter/Mixtures",
            ]
        );
    }

    #[test]
    fn next_concept_above_grade_falls_through_to_siblings() {
        let graph = science();
        let completed = graph.completed_from_paths([
            "Science/Physical_Science/Matter/Structure_Elem/Solids",
            "Science/Physical_Science/Matter/Structure_Elem/Liquids",
        ]);
        let options = Navigator::next_options(&graph, &completed, Grade(1));
        // Gases is grade 2; every sibling of Structure_Elem is above grade 1
        // too, and so is Energy. Earth_Science is the only open root.
        assert_eq!(paths(&graph, &options), vec!["Science/Earth_Science"]);
    }

    #[test]
    fn completed_siblings_are_skipped_and_walk_climbs() {
        let graph = science();
        let mut completed = graph.completed_from_paths([
            "Science/Physical_Science/Matter/Chemical_Reactions",
            "Science/Physical_Science/Matter/Mixtures",
        ]);
        if let Some(gases) = graph.resolve("Science/Physical_Science/Matter/Structure_Elem/Gases") {
            completed.push(gases);
        }
        let options = Navigator::next_options(&graph, &completed, Grade(5));
        assert_eq!(paths(&graph, &options), vec!["Science/Physical_Science/Energy"]);
    }

    #[test]
    fn root_topics_are_siblings_and_subject_terminates() {
        let graph = science();
        let completed = graph.completed_from_paths(["Science/Life_Science/Cells"]);
        let options = Navigator::next_options(&graph, &completed, Grade(12));
        assert_eq!(
            paths(&graph, &options),
            vec!["Science/Physical_Science", "Science/Earth_Science"]
        );

        let all_roots = graph.completed_from_paths([
            "Science/Physical_Science",
            "Science/Earth_Science",
            "Science/Life_Science/Cells",
        ]);
        assert!(Navigator::next_options(&graph, &all_roots, Grade(12)).is_empty());
    }

    #[test]
    fn unknown_anchor_returns_nothing() {
        let graph = science();
        let completed = graph.completed_from_paths([
            "Science/Physical_Science/Matter/Structure_Elem/Solids",
            "Science/Ghost/Concept",
        ]);
        assert!(Navigator::next_options(&graph, &completed, Grade(12)).is_empty());

        let dangling: Completed = [NodeId(10_000)].into_iter().collect();
        assert!(Navigator::next_options(&graph, &dangling, Grade(12)).is_empty());
    }

    #[test]
    fn finished_sibling_branch_is_still_offered() {
        let graph = science();
        let completed = graph.completed_from_paths([
            "Science/Physical_Science/Matter/Mixtures/Solutions",
            "Science/Physical_Science/Matter/Structure_Elem/Solids",
            "Science/Physical_Science/Matter/Structure_Elem/Liquids",
            "Science/Physical_Science/Matter/Structure_Elem/Gases",
        ]);
        let options = Navigator::next_options(&graph, &completed, Grade(5));
        assert_eq!(
            paths(&graph, &options),
            vec![
                "Science/Physical_Science/Matter/Chemical_Reactions",
                "Science/Physical_Science/Matter/Mixtures",
            ]
        );
    }

    #[test]
    fn open_siblings_excludes_self() {
        let graph = science();
        let mixtures = graph
            .resolve("Science/Physical_Science/Matter/Mixtures")
            .expect("mixtures");
        let options = Navigator::open_siblings(&graph, &Completed::new(), mixtures, Grade(12));
        assert!(!options.contains(&mixtures));
        assert_eq!(options.len(), 3);
    }
}
