//! # Taxonomy Sources
//!
//! Where subject documents come from.
//!
//! The registry only knows the [`TaxonomySource`] trait, so tests can swap
//! the filesystem for in-memory fixtures.
//!
//! - [`DirectorySource`]: one `<subject lowercase>.json` file per subject
//! - [`StaticSource`]: documents held in memory

use crate::primitives::{DEFAULT_SUBJECTS, MAX_DOCUMENT_SIZE};
use crate::{CurriculumError, TaxonomyDocument, TaxonomyLoader};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Supplies taxonomy documents by subject name.
pub trait TaxonomySource: Send + Sync {
    /// Known subject names, in display order.
    fn subjects(&self) -> Vec<String>;

    /// Load one subject's document.
    ///
    /// `Ok(None)` means the subject has no document; the registry treats
    /// that and any error as an empty graph.
    fn load(&self, subject: &str) -> Result<Option<TaxonomyDocument>, CurriculumError>;
}

// =============================================================================
// DIRECTORY SOURCE
// =============================================================================

/// Reads `<dir>/<subject lowercase>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    subjects: Vec<String>,
}

impl DirectorySource {
    /// A source over `dir` with the default subject list.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replace the subject list. Blank names are dropped.
    #[must_use]
    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.trim().is_empty())
            .collect();
        self
    }

    /// File a subject's document is read from.
    #[must_use]
    pub fn document_path(&self, subject: &str) -> PathBuf {
        self.dir.join(format!("{}.json", subject.trim().to_lowercase()))
    }
}

impl TaxonomySource for DirectorySource {
    fn subjects(&self) -> Vec<String> {
        self.subjects.clone()
    }

    fn load(&self, subject: &str) -> Result<Option<TaxonomyDocument>, CurriculumError> {
        let path = self.document_path(subject);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(CurriculumError::InvalidDocument(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_DOCUMENT_SIZE {
            return Err(CurriculumError::InvalidDocument(format!(
                "'{}' is {} bytes, exceeding the maximum of {} bytes",
                path.display(),
                metadata.len(),
                MAX_DOCUMENT_SIZE
            )));
        }

        let bytes = std::fs::read(&path)?;
        TaxonomyLoader::from_slice(&bytes).map(Some)
    }
}

// =============================================================================
// STATIC SOURCE
// =============================================================================

/// In-memory documents keyed by subject, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    order: Vec<String>,
    documents: BTreeMap<String, TaxonomyDocument>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under its own subject name, replacing any earlier one.
    #[must_use]
    pub fn with_document(mut self, document: TaxonomyDocument) -> Self {
        let key = document.subject.to_lowercase();
        if !self.documents.contains_key(&key) {
            self.order.push(document.subject.clone());
        }
        self.documents.insert(key, document);
        self
    }

    /// Parse and add a JSON document.
    pub fn with_json(self, json: &str) -> Result<Self, CurriculumError> {
        Ok(self.with_document(TaxonomyLoader::parse_str(json)?))
    }
}

impl TaxonomySource for StaticSource {
    fn subjects(&self) -> Vec<String> {
        self.order.clone()
    }

    fn load(&self, subject: &str) -> Result<Option<TaxonomyDocument>, CurriculumError> {
        Ok(self.documents.get(&subject.to_lowercase()).cloned())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MATH: &str =
        r#"{ "subject": "Math", "taxonomy": { "Counting": { "concepts": ["One", "Two"] } } }"#;

    #[test]
    fn directory_source_reads_lowercase_file() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("math.json"), MATH).expect("write");

        let source = DirectorySource::new(dir.path());
        let doc = source.load("Math").expect("load").expect("present");
        assert_eq!(doc.subject, "Math");
        assert_eq!(doc.root_count(), 1);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let source = DirectorySource::new(dir.path());
        assert!(source.load("History").expect("load").is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("science.json"), "{ not json").expect("write");
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.load("Science"),
            Err(CurriculumError::Parse(_))
        ));
    }

    #[test]
    fn directory_is_not_a_document() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir(dir.path().join("english.json")).expect("mkdir");
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.load("English"),
            Err(CurriculumError::InvalidDocument(_))
        ));
    }

    #[test]
    fn subject_list_defaults_and_overrides() {
        let source = DirectorySource::new("/nowhere");
        assert_eq!(source.subjects(), vec!["Science", "History", "Math", "English"]);

        let source = source.with_subjects(["Art", " ", "Music"]);
        assert_eq!(source.subjects(), vec!["Art", "Music"]);
        assert_eq!(source.document_path("Art"), std::path::Path::new("/nowhere/art.json"));
    }

    #[test]
    fn static_source_is_case_insensitive_and_ordered() {
        let source = StaticSource::new()
            .with_json(MATH)
            .expect("math")
            .with_json(r#"{ "subject": "Art", "taxonomy": {} }"#)
            .expect("art");
        assert_eq!(source.subjects(), vec!["Math", "Art"]);
        assert!(source.load("math").expect("load").is_some());
        assert!(source.load("Music").expect("load").is_none());
    }
}
