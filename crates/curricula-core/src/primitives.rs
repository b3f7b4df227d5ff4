//! # Primitives
//!
//! Hardcoded runtime constants for the curriculum core.
//!
//! These values are compiled into the binary and are immutable at runtime.

use crate::Grade;

/// Separator used when rendering and resolving human-readable node paths.
///
/// A path is `Subject/topic/.../label`. Paths are presentation only; node
/// identity is the opaque [`crate::NodeId`].
pub const PATH_SEPARATOR: &str = "/";

/// Grade assigned to a root that declares none and has no concept
/// descendants to bubble up from.
pub const DEFAULT_GRADE: Grade = Grade(0);

/// Lowest grade the coverage check expects core content for.
pub const COVERAGE_MIN_GRADE: Grade = Grade::KINDERGARTEN;

/// Highest grade the coverage check expects core content for.
pub const COVERAGE_MAX_GRADE: Grade = Grade::TWELFTH;

/// Maximum traversal depth for transitive prerequisite queries.
///
/// All queries must be computationally bounded.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;

/// Subjects a directory source looks for when none are configured.
pub const DEFAULT_SUBJECTS: [&str; 4] = ["Science", "History", "Math", "English"];

/// Default number of nodes returned by a map window.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Upper bound on map window size.
pub const MAX_WINDOW_SIZE: usize = 1000;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a taxonomy document read from disk (32 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
pub const MAX_DOCUMENT_SIZE: u64 = 32 * 1024 * 1024;

/// Maximum container nesting below the subject.
///
/// Deeper nodes are skipped with a warning.
pub const MAX_TAXONOMY_DEPTH: usize = 16;
