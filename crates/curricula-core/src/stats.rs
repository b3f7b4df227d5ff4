//! # Completion Statistics
//!
//! Done/total counts of mandatory (core) concepts.
//!
//! Ratios are integer-only. A zero total is an undefined ratio and is
//! surfaced as `None` rather than divided.

use crate::{Completed, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Core concepts completed out of core concepts in scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mastery {
    pub done: usize,
    pub total: usize,
}

impl Mastery {
    pub const EMPTY: Mastery = Mastery { done: 0, total: 0 };

    #[must_use]
    pub const fn new(done: usize, total: usize) -> Self {
        Self { done, total }
    }

    /// Completion in thousandths, rounded down. `None` when nothing is in scope.
    #[must_use]
    pub fn permille(&self) -> Option<u16> {
        self.ratio(1000)
    }

    /// Completion in percent, rounded down. `None` when nothing is in scope.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        self.ratio(100).map(|p| p as u8)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done >= self.total
    }

    fn ratio(&self, scale: usize) -> Option<u16> {
        let scaled = self.done.min(self.total).checked_mul(scale)?;
        scaled.checked_div(self.total).map(|r| r as u16)
    }
}

impl Add for Mastery {
    type Output = Mastery;

    fn add(self, rhs: Mastery) -> Mastery {
        Mastery {
            done: self.done.saturating_add(rhs.done),
            total: self.total.saturating_add(rhs.total),
        }
    }
}

impl Sum for Mastery {
    fn sum<I: Iterator<Item = Mastery>>(iter: I) -> Mastery {
        iter.fold(Mastery::EMPTY, Add::add)
    }
}

/// Computes mastery over a subject graph.
pub struct CompletionStats;

impl CompletionStats {
    /// Mastery over the whole graph or a scoped subtree.
    ///
    /// `scope` is a node path. `None` or the bare subject name covers the
    /// whole graph; a path that resolves to nothing yields `(0, 0)`.
    pub fn compute(graph: &Graph, completed: &Completed, scope: Option<&str>) -> Mastery {
        match scope.map(str::trim) {
            None => Self::whole(graph, completed),
            Some(s) if s.is_empty() || s == graph.subject() => Self::whole(graph, completed),
            Some(path) => match graph.resolve(path) {
                Some(root) => Self::subtree(graph, completed, root),
                None => Mastery::EMPTY,
            },
        }
    }

    /// Mastery of the unit containing `current`: the subtree of its parent.
    ///
    /// For a root the unit is the whole subject. Unknown ids yield `(0, 0)`.
    pub fn unit(graph: &Graph, completed: &Completed, current: NodeId) -> Mastery {
        if !graph.contains_node(current) {
            return Mastery::EMPTY;
        }
        match graph.parent(current) {
            Some(parent) => Self::subtree(graph, completed, parent),
            None => Self::whole(graph, completed),
        }
    }

    /// Mastery of `root` and everything below it.
    pub fn subtree(graph: &Graph, completed: &Completed, root: NodeId) -> Mastery {
        if !graph.contains_node(root) {
            return Mastery::EMPTY;
        }
        Self::count(
            graph,
            completed,
            std::iter::once(root).chain(graph.descendants(root)),
        )
    }

    fn whole(graph: &Graph, completed: &Completed) -> Mastery {
        Self::count(graph, completed, graph.nodes().map(|n| n.id))
    }

    fn count(graph: &Graph, completed: &Completed, ids: impl Iterator<Item = NodeId>) -> Mastery {
        let mut mastery = Mastery::EMPTY;
        for id in ids {
            if graph.node(id).is_some_and(|n| n.is_core_concept()) {
                mastery.total = mastery.total.saturating_add(1);
                if completed.contains(id) {
                    mastery.done = mastery.done.saturating_add(1);
                }
            }
        }
        if mastery.total == 0 {
            return Mastery::EMPTY;
        }
        mastery
    }
}

// =============================================================================
// TESTS
// =============================================================================
