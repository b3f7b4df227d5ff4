//! # Core Type Definitions
//!
//! This module contains all core types for the curriculum graph:
//! - Node handles and classification (`NodeId`, `NodeKind`, `NodeType`, `EdgeKind`)
//! - Grade levels (`Grade`)
//! - The node record (`TaxonomyNode`)
//! - Caller-owned progress (`Completed`)
//! - Error types (`CurriculumError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// NODE HANDLE
// =============================================================================

/// Opaque handle for a node inside one subject graph.
///
/// Handles are assigned in authored pre-order while the graph is built, so
/// sorting by handle reproduces document order. The human-readable path is
/// derived on demand via [`crate::Graph::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into dense per-graph storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// GRADE
// =============================================================================

/// A grade level: 0 = Kindergarten, 1..=12 school grades, 13+ post-secondary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Grade(pub u8);

impl Grade {
    /// Kindergarten.
    pub const KINDERGARTEN: Grade = Grade(0);
    /// Last school grade.
    pub const TWELFTH: Grade = Grade(12);
    /// First post-secondary level.
    pub const POST_SECONDARY: Grade = Grade(13);

    /// Create a grade from its numeric level.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    /// Raw numeric level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Absolute distance between two grades.
    #[must_use]
    pub const fn distance(self, other: Grade) -> u8 {
        self.0.abs_diff(other.0)
    }

    /// Parse an authored JSON grade value.
    ///
    /// Accepts non-negative integers and anything [`Grade::from_str`] accepts.
    /// Returns `None` for anything else.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .map(Grade),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "K"),
            n if n >= Self::POST_SECONDARY.0 => write!(f, "PS{}", n - Self::TWELFTH.0),
            n => write!(f, "{}", n),
        }
    }
}

impl FromStr for Grade {
    type Err = CurriculumError;

    /// Parses `"K"`, numeric strings, and coarse grade bands.
    ///
    /// Bands map to their lowest grade: elementary → K, middle → 6,
    /// high → 9, post-secondary/college → 13.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<u8>() {
            return Ok(Grade(level));
        }
        let normalized = trimmed.to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "k" | "kindergarten" | "elementary" => Ok(Grade(0)),
            "middle" => Ok(Grade(6)),
            "high" => Ok(Grade(9)),
            "post-secondary" | "postsecondary" | "college" => Ok(Self::POST_SECONDARY),
            _ => Err(CurriculumError::InvalidDocument(format!(
                "unrecognized grade level '{}'",
                s
            ))),
        }
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Structural position of a node in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Subtopic,
    Subsubtopic,
    Concept,
}

impl NodeKind {
    /// Container kind for a given depth below the subject.
    #[must_use]
    pub const fn container_at(depth: usize) -> Self {
        match depth {
            0 => NodeKind::Topic,
            1 => NodeKind::Subtopic,
            _ => NodeKind::Subsubtopic,
        }
    }

    /// True for every kind except `Concept`.
    #[must_use]
    pub const fn is_container(self) -> bool {
        !matches!(self, NodeKind::Concept)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Topic => "topic",
            NodeKind::Subtopic => "subtopic",
            NodeKind::Subsubtopic => "subsubtopic",
            NodeKind::Concept => "concept",
        }
    }
}

/// Curricular weight of a node.
///
/// Only `Core` content counts toward mastery statistics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Core,
    Recommended,
    #[serde(alias = "optional")]
    Enrichment,
}

impl NodeType {
    #[must_use]
    pub const fn is_core(self) -> bool {
        matches!(self, NodeType::Core)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Core => "core",
            NodeType::Recommended => "recommended",
            NodeType::Enrichment => "enrichment",
        }
    }
}

impl FromStr for NodeType {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(NodeType::Core),
            "recommended" => Ok(NodeType::Recommended),
            "enrichment" | "optional" => Ok(NodeType::Enrichment),
            other => Err(CurriculumError::InvalidDocument(format!(
                "unrecognized node type '{}'",
                other
            ))),
        }
    }
}

/// Kind of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Parent → child. Structural only, never a learning prerequisite.
    Containment,
    /// Earlier concept → later concept that depends on it.
    Prerequisite,
}

// =============================================================================
// NODE
// =============================================================================

/// A node of a subject graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Handle of this node.
    pub id: NodeId,
    /// Authored key (containers) or label (concepts); one path segment.
    pub key: String,
    /// Display label.
    pub label: String,
    pub kind: NodeKind,
    /// Authoritative grade after bubble-up.
    pub grade_level: Grade,
    pub node_type: NodeType,
    pub description: String,
    pub parent: Option<NodeId>,
    /// Position within the authored concept list, for concepts that have one.
    pub sequence_index: Option<usize>,
}

impl TaxonomyNode {
    #[must_use]
    pub fn is_concept(&self) -> bool {
        self.kind == NodeKind::Concept
    }

    /// Core concept: counted toward mastery.
    #[must_use]
    pub fn is_core_concept(&self) -> bool {
        self.is_concept() && self.node_type.is_core()
    }
}

// =============================================================================
// COMPLETED (caller-owned progress)
// =============================================================================

/// One entry of a completed-set, in caller-defined order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedEntry {
    /// Resolved node.
    Known(NodeId),
    /// A path that did not resolve in this graph.
    Unknown,
}

/// The set of completed nodes supplied by the external progress store.
///
/// Order is authoritative: the last entry is the navigation anchor.
/// Membership is tracked separately for O(log n) lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completed {
    order: Vec<CompletedEntry>,
    members: BTreeSet<NodeId>,
}

impl Completed {
    /// Create an empty completed-set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed node.
    pub fn push(&mut self, id: NodeId) {
        self.order.push(CompletedEntry::Known(id));
        self.members.insert(id);
    }

    /// Record an entry that could not be resolved.
    pub fn push_unknown(&mut self) {
        self.order.push(CompletedEntry::Unknown);
    }

    /// True when the caller supplied no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of entries, unknown ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// The most recently completed entry, if it resolved.
    #[must_use]
    pub fn anchor(&self) -> Option<NodeId> {
        match self.order.last() {
            Some(CompletedEntry::Known(id)) => Some(*id),
            _ => None,
        }
    }

    /// Resolved members in ascending handle order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }
}

impl FromIterator<NodeId> for Completed {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut completed = Completed::new();
        for id in iter {
            completed.push(id);
        }
        completed
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised at the loading and configuration boundaries.
///
/// Graph queries never return errors; they fail soft with empty results.
#[derive(Debug, Error)]
pub enum CurriculumError {
    /// The taxonomy document is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is JSON but does not have the expected outer shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A subject name the caller asked for is not known to any source.
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),
}

// =============================================================================
// TESTS
// =============================================================================
