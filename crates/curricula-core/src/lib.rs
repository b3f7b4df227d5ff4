//! # curricula-core
//!
//! The deterministic curriculum graph engine.
//!
//! This crate loads a subject's nested taxonomy (subject → topic → subtopic
//! → sub-subtopic → concept) into an immutable, prerequisite-aware DAG and
//! answers four questions over it:
//!
//! - which concepts are learnable now ([`Frontier`])
//! - how much mandatory content is complete ([`CompletionStats`])
//! - what a concept's prerequisites are ([`Prerequisites`])
//! - which branch comes next once a sequence is exhausted ([`Navigator`])
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no persistence format
//! - Deterministic: `BTreeMap`/`BTreeSet` only, integer-only ratios
//! - Immutable after build: graphs are shared as `Arc<Graph>`
//! - Fail-soft: queries never error; unknown input yields empty results
//! - Learner progress is owned by the caller and only ever read

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod frontier;
pub mod graph;
pub mod navigator;
pub mod prerequisites;
pub mod primitives;
pub mod registry;
pub mod source;
pub mod stats;
pub mod taxonomy;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Completed, CompletedEntry, CurriculumError, EdgeKind, Grade, NodeId, NodeKind, NodeType,
    TaxonomyNode,
};

// =============================================================================
// RE-EXPORTS: Loading and Building
// =============================================================================

pub use builder::GraphBuilder;
pub use graph::Graph;
pub use source::{DirectorySource, StaticSource, TaxonomySource};
pub use taxonomy::{TaxonomyDocument, TaxonomyLoader};

// =============================================================================
// RE-EXPORTS: Queries
// =============================================================================

pub use frontier::Frontier;
pub use navigator::Navigator;
pub use prerequisites::{PrerequisiteStep, Prerequisites};
pub use registry::{Progress, SubjectRegistry};
pub use stats::{CompletionStats, Mastery};
pub use validation::{ValidationReport, validate};
pub use view::{NodeStatus, NodeView, window};
