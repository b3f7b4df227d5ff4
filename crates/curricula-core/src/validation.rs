//! # Graph Validation
//!
//! Structural and coverage checks over a built graph.
//!
//! | Severity | Check |
//! |----------|-------|
//! | error | concept with outgoing containment edge |
//! | error | cycle over any edge kind |
//! | error | container grade differs from the minimum of its concepts |
//! | warning | grade K..=12 with no core concept |
//! | info | number of optional (recommended / enrichment) nodes |
//!
//! A graph produced by [`crate::GraphBuilder`] never has errors.

use crate::primitives::{COVERAGE_MAX_GRADE, COVERAGE_MIN_GRADE};
use crate::{EdgeKind, Grade, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

/// Run every check against `graph`.
pub fn validate(graph: &Graph) -> ValidationReport {
    let mut report = ValidationReport::default();

    if graph.is_empty() {
        report
            .warnings
            .push(format!("{} has no nodes", graph.subject()));
        report.valid = true;
        return report;
    }

    check_concept_leaves(graph, &mut report);
    check_acyclic(graph, &mut report);
    check_bubble_up(graph, &mut report);
    check_coverage(graph, &mut report);

    let optional = graph.nodes().filter(|n| !n.node_type.is_core()).count();
    report.info.push(format!("{optional} optional nodes"));

    report.valid = report.errors.is_empty();
    tracing::debug!(
        subject = %graph.subject(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated curriculum graph"
    );
    report
}

fn display(graph: &Graph, id: NodeId) -> String {
    graph.path(id).unwrap_or_else(|| format!("{id:?}"))
}

fn check_concept_leaves(graph: &Graph, report: &mut ValidationReport) {
    for concept in graph.concepts() {
        let contains = graph
            .successors(concept.id)
            .any(|(_, kind)| kind == EdgeKind::Containment);
        if contains {
            report.errors.push(format!(
                "concept {} has outgoing containment edges",
                display(graph, concept.id)
            ));
        }
    }
}

/// Iterative three-colour DFS; reports the node each back edge closes on.
fn check_acyclic(graph: &Graph, report: &mut ValidationReport) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Active,
        Done,
    }

    let mut marks: BTreeMap<NodeId, Mark> = BTreeMap::new();
    let mut reported = BTreeSet::new();

    for start in graph.nodes().map(|n| n.id) {
        if marks.contains_key(&start) {
            continue;
        }
        marks.insert(start, Mark::Active);
        let mut stack: Vec<(NodeId, Vec<NodeId>)> =
            vec![(start, graph.successors(start).map(|(to, _)| to).collect())];

        while let Some((current, pending)) = stack.last_mut() {
            let current = *current;
            match pending.pop() {
                Some(next) => match marks.get(&next) {
                    Some(Mark::Active) => {
                        if reported.insert(next) {
                            report
                                .errors
                                .push(format!("cycle through {}", display(graph, next)));
                        }
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Active);
                        stack.push((next, graph.successors(next).map(|(to, _)| to).collect()));
                    }
                },
                None => {
                    marks.insert(current, Mark::Done);
                    stack.pop();
                }
            }
        }
    }
}

fn check_bubble_up(graph: &Graph, report: &mut ValidationReport) {
    for node in graph.nodes().filter(|n| n.kind.is_container()) {
        let minimum = graph
            .descendants(node.id)
            .into_iter()
            .filter_map(|id| graph.node(id))
            .filter(|n| n.is_concept())
            .map(|n| n.grade_level)
            .min();
        if let Some(minimum) = minimum {
            if minimum != node.grade_level {
                report.errors.push(format!(
                    "{} has grade {} but its earliest concept is grade {}",
                    display(graph, node.id),
                    node.grade_level,
                    minimum
                ));
            }
        }
    }
}

fn check_coverage(graph: &Graph, report: &mut ValidationReport) {
    let covered: BTreeSet<Grade> = graph
        .concepts()
        .filter(|n| n.node_type.is_core())
        .map(|n| n.grade_level)
        .collect();

    for level in COVERAGE_MIN_GRADE.value()..=COVERAGE_MAX_GRADE.value() {
        let grade = Grade(level);
        if !covered.contains(&grade) {
            report.warnings.push(format!("no core concepts at grade {grade}"));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
