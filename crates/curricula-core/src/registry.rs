//! # Subject Registry
//!
//! One immutable graph per subject, built on first access and shared.
//!
//! The registry is an explicit object: construct it once, pass it by
//! reference. Each subject owns a `OnceLock` cell, so concurrent first
//! callers block until the single build finishes and never observe a
//! partially built graph. Afterwards reads are a map lookup and an `Arc`
//! clone.

use crate::primitives::PATH_SEPARATOR;
use crate::source::TaxonomySource;
use crate::stats::{CompletionStats, Mastery};
use crate::{Completed, Grade, Graph, GraphBuilder, Navigator};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type GraphCell = Arc<OnceLock<Arc<Graph>>>;

/// Completed paths per subject, as supplied by the progress store.
pub type Progress = BTreeMap<String, Vec<String>>;

pub struct SubjectRegistry<S: TaxonomySource> {
    source: S,
    /// Lowercased subject -> build-once cell
    graphs: RwLock<BTreeMap<String, GraphCell>>,
}

impl<S: TaxonomySource> SubjectRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            graphs: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Subject names: the source's list, then any injected graphs it lacks.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects = self.source.subjects();
        let injected: Vec<String> = {
            let graphs = self.graphs.read().unwrap_or_else(PoisonError::into_inner);
            graphs
                .values()
                .filter_map(|cell| cell.get().map(|g| g.subject().to_string()))
                .collect()
        };
        for name in injected {
            if !subjects.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
                subjects.push(name);
            }
        }
        subjects
    }

    /// The graph for a subject, building it on first access.
    ///
    /// Accepts a bare subject name or any node path; only the first segment
    /// is used, case-insensitively. A missing or unreadable document yields
    /// an empty graph.
    ///
    /// Names the source does not list and that were never inserted get a
    /// fresh empty graph that is not cached, so stray lookups never add
    /// subjects.
    pub fn graph(&self, subject: &str) -> Arc<Graph> {
        let name = Self::subject_of(subject);
        let key = name.to_lowercase();

        let cell = match self.cached(&key) {
            Some(cell) => cell,
            None => {
                if self.listed_name(name).is_none() {
                    tracing::debug!(subject = %name, "subject not listed by source");
                    return Arc::new(Graph::empty(name));
                }
                self.cell(&key)
            }
        };
        let graph = cell.get_or_init(|| {
            let display = self.listed_name(name).unwrap_or_else(|| name.to_string());
            Arc::new(self.build(&display))
        });
        Arc::clone(graph)
    }

    /// Inject a prebuilt graph, replacing whatever the subject held.
    pub fn insert(&self, graph: Graph) -> Arc<Graph> {
        let key = graph.subject().to_lowercase();
        let graph = Arc::new(graph);
        let cell = Arc::new(OnceLock::from(Arc::clone(&graph)));
        self.graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, cell);
        graph
    }

    /// Cross-subject navigation over ordered completed paths.
    ///
    /// A cold start offers the entry points of every subject, or only of
    /// `subject_filter` when given. Otherwise the subject is taken from the
    /// last path and navigation proceeds within that graph.
    pub fn next_options<P: AsRef<str>>(
        &self,
        completed: &[P],
        grade: Grade,
        subject_filter: Option<&str>,
    ) -> Vec<String> {
        let Some(anchor) = completed.last() else {
            return self.entry_points(grade, subject_filter);
        };

        let graph = self.graph(anchor.as_ref());
        let completed = graph.completed_from_paths(completed.iter().map(AsRef::as_ref));
        Navigator::next_options(&graph, &completed, grade)
            .into_iter()
            .filter_map(|id| graph.path(id))
            .collect()
    }

    /// Root topics within reach of `grade` across subjects, as paths.
    pub fn entry_points(&self, grade: Grade, subject_filter: Option<&str>) -> Vec<String> {
        let filter = subject_filter.map(Self::subject_of);
        self.subjects()
            .iter()
            .filter(|s| filter.is_none_or(|f| s.eq_ignore_ascii_case(f)))
            .flat_map(|subject| {
                let graph = self.graph(subject);
                Navigator::entry_points(&graph, grade)
                    .into_iter()
                    .filter_map(|id| graph.path(id))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Mastery for each known subject, in subject order.
    pub fn subject_stats(&self, progress: &Progress) -> Vec<(String, Mastery)> {
        self.subjects()
            .into_iter()
            .map(|subject| {
                let graph = self.graph(&subject);
                let completed = Self::completed_for(&graph, progress);
                let mastery = CompletionStats::compute(&graph, &completed, None);
                (subject, mastery)
            })
            .collect()
    }

    /// Sum of per-subject mastery.
    pub fn aggregate_stats(&self, progress: &Progress) -> Mastery {
        self.subject_stats(progress)
            .into_iter()
            .map(|(_, mastery)| mastery)
            .sum()
    }

    /// Resolve a subject's progress entry (matched case-insensitively).
    pub fn completed_for(graph: &Graph, progress: &Progress) -> Completed {
        progress
            .iter()
            .find(|(subject, _)| subject.eq_ignore_ascii_case(graph.subject()))
            .map(|(_, paths)| graph.completed_from_paths(paths))
            .unwrap_or_default()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn subject_of(name_or_path: &str) -> &str {
        name_or_path
            .split(PATH_SEPARATOR)
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// The source's spelling of a subject, if the source lists it.
    fn listed_name(&self, name: &str) -> Option<String> {
        self.source
            .subjects()
            .into_iter()
            .find(|s| s.eq_ignore_ascii_case(name))
    }

    fn cached(&self, key: &str) -> Option<GraphCell> {
        let graphs = self.graphs.read().unwrap_or_else(PoisonError::into_inner);
        graphs.get(key).map(Arc::clone)
    }

    fn cell(&self, key: &str) -> GraphCell {
        let mut graphs = self.graphs.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(graphs.entry(key.to_string()).or_default())
    }

    fn build(&self, subject: &str) -> Graph {
        match self.source.load(subject) {
            Ok(Some(document)) => {
                if !document.subject.eq_ignore_ascii_case(subject) {
                    tracing::warn!(
                        requested = %subject,
                        declared = %document.subject,
                        "document declares a different subject"
                    );
                }
                GraphBuilder::build(&document)
            }
            Ok(None) => {
                tracing::warn!(
                    subject = %subject,
                    "no taxonomy document; using an empty graph"
                );
                Graph::empty(subject)
            }
            Err(e) => {
                tracing::warn!(
                    subject = %subject,
                    error = %e,
                    "failed to load taxonomy; using an empty graph"
                );
                Graph::empty(subject)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use crate::{CurriculumError, TaxonomyDocument, TaxonomyLoader};

    const MATH: &str = r#"{ "subject": "Math", "taxonomy": {
        "Counting": { "concepts": [ { "label": "One", "grade_level": 0 }, { "label": "Two", "grade_level": 0 } ] },
        "Algebra": { "concepts": [ { "label": "Variables", "grade_level": 7 } ] }
    } }"#;

    const ENGLISH: &str = r#"{ "subject": "English", "taxonomy": {
        "Phonics": { "concepts": [ { "label": "Letters", "grade_level": 0 } ] }
    } }"#;

    fn registry() -> SubjectRegistry<StaticSource> {
        let source = StaticSource::new()
            .with_json(MATH)
            .expect("math")
            .with_json(ENGLISH)
            .expect("english");
        SubjectRegistry::new(source)
    }

    struct FailingSource;

    impl TaxonomySource for FailingSource {
        fn subjects(&self) -> Vec<String> {
            vec!["Broken".to_string()]
        }

        fn load(&self, _subject: &str) -> Result<Option<TaxonomyDocument>, CurriculumError> {
            Err(CurriculumError::InvalidDocument("boom".to_string()))
        }
    }

    #[test]
    fn graph_lookup_normalizes_subject() {
        let registry = registry();
        let a = registry.graph("Math");
        let b = registry.graph("math");
        let c = registry.graph("MATH/Counting/One");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(a.subject(), "Math");
    }

    #[test]
    fn missing_and_failing_subjects_are_empty() {
        let registry = registry();
        let history = registry.graph("History");
        assert!(history.is_empty());
        assert_eq!(history.subject(), "History");

        let broken = SubjectRegistry::new(FailingSource);
        assert!(broken.graph("Broken").is_empty());
        // Other subjects are unaffected.
        assert!(!registry.graph("English").is_empty());
    }

    #[test]
    fn inserted_graph_replaces_source() {
        let registry = registry();
        let doc = TaxonomyLoader::parse_str(
            r#"{ "subject": "Math", "taxonomy": { "Fixture": { "concepts": ["Only"] } } }"#,
        )
        .expect("load");
        registry.insert(GraphBuilder::build(&doc));
        assert!(registry.graph("math").resolve("Math/Fixture/Only").is_some());

        registry.insert(Graph::empty("Art"));
        assert_eq!(registry.subjects(), vec!["Math", "English", "Art"]);
    }

    #[test]
    fn cold_start_spans_subjects_and_honors_filter() {
        let registry = registry();
        let empty: [&str; 0] = [];
        assert_eq!(
            registry.next_options(&empty, Grade(2), None),
            vec!["Math/Counting", "English/Phonics"]
        );
        assert_eq!(
            registry.next_options(&empty, Grade(2), Some("english")),
            vec!["English/Phonics"]
        );
    }

    #[test]
    fn warm_path_uses_anchor_subject() {
        let registry = registry();
        let options = registry.next_options(
            &["English/Phonics/Letters", "Math/Counting/One"],
            Grade(2),
            None,
        );
        assert_eq!(options, vec!["Math/Counting/Two"]);

        let ghost = registry.next_options(&["Math/Ghost"], Grade(12), None);
        assert!(ghost.is_empty());
    }

    #[test]
    fn aggregate_sums_subjects() {
        let registry = registry();
        let mut progress = Progress::new();
        progress.insert("math".to_string(), vec!["Math/Counting/One".to_string()]);
        progress.insert(
            "English".to_string(),
            vec!["English/Phonics/Letters".to_string()],
        );

        let per_subject = registry.subject_stats(&progress);
        assert_eq!(
            per_subject,
            vec![
                ("Math".to_string(), Mastery::new(1, 3)),
                ("English".to_string(), Mastery::new(1, 1)),
            ]
        );
        assert_eq!(registry.aggregate_stats(&progress), Mastery::new(2, 4));
    }

    #[test]
    fn unlisted_lookups_leave_subjects_unchanged() {
        let registry = registry();
        let progress = Progress::new();
        let before = registry.subject_stats(&progress);
        let empty: [&str; 0] = [];
        let cold = registry.next_options(&empty, Grade(2), None);

        assert!(registry.next_options(&["Ghost/Nowhere"], Grade(12), None).is_empty());
        assert!(registry.graph("").is_empty());
        assert_eq!(registry.graph("Ghost").subject(), "Ghost");

        assert_eq!(registry.subjects(), vec!["Math", "English"]);
        assert_eq!(registry.subject_stats(&progress), before);
        assert_eq!(registry.aggregate_stats(&progress), Mastery::new(0, 4));
        assert_eq!(registry.next_options(&empty, Grade(2), None), cold);
    }
}
