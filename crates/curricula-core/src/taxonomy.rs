//! # Taxonomy Loader
//!
//! Parses a subject's taxonomy document into typed records.
//!
//! - Authored key order is preserved (serde_json `preserve_order`)
//! - Shape problems inside the tree never fail the load; they become
//!   `Malformed` records that the builder skips
//! - Only the outer envelope (`subject` plus `taxonomy` or `nodes`) is required

use crate::primitives::MAX_TAXONOMY_DEPTH;
use crate::{CurriculumError, Grade, NodeType};
use serde_json::{Map, Value};

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A parsed taxonomy document for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyDocument {
    pub subject: String,
    pub body: TaxonomyBody,
}

/// The two accepted document layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomyBody {
    /// `taxonomy: { key: node, ... }` — containers and concept lists.
    Nested(Vec<TaxonomyEntry>),
    /// `nodes: [ { id, prerequisites, ... } ]` — legacy flat concept list.
    Flat(Vec<FlatEntry>),
}

/// Attributes shared by every authored node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttrs {
    /// Explicit display label, when it differs from the key.
    pub label: Option<String>,
    pub grade_level: Option<Grade>,
    pub node_type: Option<NodeType>,
    pub description: String,
}

/// One keyed node of the nested taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub key: String,
    pub shape: EntryShape,
}

/// What an authored node turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryShape {
    /// Holds a keyed map of child nodes.
    Container {
        attrs: NodeAttrs,
        children: Vec<TaxonomyEntry>,
    },
    /// Holds an ordered list of concepts.
    ConceptList {
        attrs: NodeAttrs,
        concepts: Vec<ConceptEntry>,
    },
    /// Matches neither shape.
    Malformed { reason: String },
}

/// One element of an authored concept list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConceptEntry {
    Concept(RawConcept),
    Malformed { reason: String },
}

/// A concept as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConcept {
    pub label: String,
    pub grade_level: Option<Grade>,
    pub node_type: Option<NodeType>,
    pub description: String,
}

/// One element of a legacy flat document.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatEntry {
    Node(FlatNode),
    Malformed { reason: String },
}

/// A legacy flat node with explicit prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub id: String,
    pub attrs: NodeAttrs,
    pub prerequisites: Vec<String>,
}

impl TaxonomyDocument {
    /// Number of top-level entries.
    #[must_use]
    pub fn root_count(&self) -> usize {
        match &self.body {
            TaxonomyBody::Nested(entries) => entries.len(),
            TaxonomyBody::Flat(nodes) => nodes.len(),
        }
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Parses taxonomy documents.
pub struct TaxonomyLoader;

impl TaxonomyLoader {
    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<TaxonomyDocument, CurriculumError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    /// Parse a document from a JSON string.
    pub fn parse_str(json: &str) -> Result<TaxonomyDocument, CurriculumError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a document from an already-decoded JSON value.
    ///
    /// Fails only when the envelope is wrong: not an object, no `subject`
    /// string, or neither a `taxonomy` object nor a `nodes` list.
    pub fn from_value(value: &Value) -> Result<TaxonomyDocument, CurriculumError> {
        let obj = value.as_object().ok_or_else(|| {
            CurriculumError::InvalidDocument("document is not a JSON object".to_string())
        })?;

        let subject = obj
            .get("subject")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CurriculumError::InvalidDocument("missing 'subject' string".to_string())
            })?
            .to_string();

        let body = if let Some(taxonomy) = obj.get("taxonomy") {
            let map = taxonomy.as_object().ok_or_else(|| {
                CurriculumError::InvalidDocument(format!(
                    "'taxonomy' of {} is not an object",
                    subject
                ))
            })?;
            TaxonomyBody::Nested(parse_children(map, 0))
        } else if let Some(nodes) = obj.get("nodes") {
            let list = nodes.as_array().ok_or_else(|| {
                CurriculumError::InvalidDocument(format!("'nodes' of {} is not a list", subject))
            })?;
            TaxonomyBody::Flat(list.iter().map(parse_flat).collect())
        } else {
            return Err(CurriculumError::InvalidDocument(format!(
                "{} has neither 'taxonomy' nor 'nodes'",
                subject
            )));
        };

        Ok(TaxonomyDocument { subject, body })
    }
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

fn parse_children(map: &Map<String, Value>, depth: usize) -> Vec<TaxonomyEntry> {
    map.iter()
        .map(|(key, value)| TaxonomyEntry {
            key: key.clone(),
            shape: parse_shape(key, value, depth),
        })
        .collect()
}

fn parse_shape(key: &str, value: &Value, depth: usize) -> EntryShape {
    let Some(obj) = value.as_object() else {
        return EntryShape::Malformed {
            reason: "node is not an object".to_string(),
        };
    };

    if depth >= MAX_TAXONOMY_DEPTH {
        return EntryShape::Malformed {
            reason: format!("nesting deeper than {} levels", MAX_TAXONOMY_DEPTH),
        };
    }

    let attrs = parse_attrs(key, obj);

    if let Some(concepts) = obj.get("concepts") {
        let Some(list) = concepts.as_array() else {
            return EntryShape::Malformed {
                reason: "'concepts' is not a list".to_string(),
            };
        };
        if obj.contains_key("subtopics") {
            tracing::warn!(
                node = key,
                "node has both 'concepts' and 'subtopics'; subtopics ignored"
            );
        }
        return EntryShape::ConceptList {
            attrs,
            concepts: list.iter().map(|c| parse_concept(key, c)).collect(),
        };
    }

    if let Some(subtopics) = obj.get("subtopics") {
        let Some(map) = subtopics.as_object() else {
            return EntryShape::Malformed {
                reason: "'subtopics' is not an object".to_string(),
            };
        };
        return EntryShape::Container {
            attrs,
            children: parse_children(map, depth.saturating_add(1)),
        };
    }

    EntryShape::Malformed {
        reason: "neither 'subtopics' nor 'concepts'".to_string(),
    }
}

fn parse_concept(holder: &str, value: &Value) -> ConceptEntry {
    // A bare string is shorthand for a label-only concept.
    if let Some(label) = value.as_str() {
        return match non_empty(label) {
            Some(label) => ConceptEntry::Concept(RawConcept {
                label,
                grade_level: None,
                node_type: None,
                description: String::new(),
            }),
            None => ConceptEntry::Malformed {
                reason: "empty concept label".to_string(),
            },
        };
    }

    let Some(obj) = value.as_object() else {
        return ConceptEntry::Malformed {
            reason: "concept is neither an object nor a string".to_string(),
        };
    };

    let Some(label) = obj.get("label").and_then(Value::as_str).and_then(non_empty) else {
        return ConceptEntry::Malformed {
            reason: "concept has no 'label'".to_string(),
        };
    };

    let attrs = parse_attrs(holder, obj);
    ConceptEntry::Concept(RawConcept {
        label,
        grade_level: attrs.grade_level,
        node_type: attrs.node_type,
        description: attrs.description,
    })
}

fn parse_flat(value: &Value) -> FlatEntry {
    let Some(obj) = value.as_object() else {
        return FlatEntry::Malformed {
            reason: "node is not an object".to_string(),
        };
    };
    let Some(id) = obj.get("id").and_then(Value::as_str).and_then(non_empty) else {
        return FlatEntry::Malformed {
            reason: "node has no 'id'".to_string(),
        };
    };

    let prerequisites = match obj.get("prerequisites") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|p| p.as_str().and_then(non_empty))
            .collect(),
        Some(_) => {
            tracing::warn!(node = %id, "'prerequisites' is not a list; ignored");
            Vec::new()
        }
        None => Vec::new(),
    };

    FlatEntry::Node(FlatNode {
        attrs: parse_attrs(&id, obj),
        id,
        prerequisites,
    })
}

fn parse_attrs(context: &str, obj: &Map<String, Value>) -> NodeAttrs {
    let grade_level = obj.get("grade_level").and_then(|raw| {
        let parsed = Grade::from_json(raw);
        if parsed.is_none() && !raw.is_null() {
            tracing::warn!(node = context, value = %raw, "unparseable grade_level; inheriting");
        }
        parsed
    });

    let node_type = obj.get("type").and_then(|raw| {
        let parsed = raw.as_str().and_then(|s| s.parse::<NodeType>().ok());
        if parsed.is_none() && !raw.is_null() {
            tracing::warn!(node = context, value = %raw, "unrecognized type; inheriting");
        }
        parsed
    });

    NodeAttrs {
        label: obj.get("label").and_then(Value::as_str).and_then(non_empty),
        grade_level,
        node_type,
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(doc: &TaxonomyDocument) -> &[TaxonomyEntry] {
        match &doc.body {
            TaxonomyBody::Nested(entries) => entries,
            TaxonomyBody::Flat(_) => &[],
        }
    }

    #[test]
    fn parses_nested_document_in_authored_order() {
        let doc = TaxonomyLoader::parse_str(
            r#"{
                "subject": "Math",
                "taxonomy": {
                    "Zeta": { "grade_level": 3, "concepts": [ { "label": "Z1" } ] },
                    "Alpha": { "grade_level": 1, "subtopics": {} }
                }
            }"#,
        )
        .expect("load");

        assert_eq!(doc.subject, "Math");
        let keys: Vec<_> = nested(&doc).iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn concept_attributes_are_typed() {
        let doc = TaxonomyLoader::parse_str(
            r#"{
                "subject": "Math",
                "taxonomy": {
                    "Units": {
                        "type": "recommended",
                        "concepts": [
                            { "label": "Feet", "grade_level": "K", "type": "core", "description": "12 inches" },
                            "Pounds"
                        ]
                    }
                }
            }"#,
        )
        .expect("load");

        let EntryShape::ConceptList { attrs, concepts } = &nested(&doc)[0].shape else {
            unreachable!("expected a concept list");
        };
        assert_eq!(attrs.node_type, Some(NodeType::Recommended));
        assert_eq!(
            concepts[0],
            ConceptEntry::Concept(RawConcept {
                label: "Feet".to_string(),
                grade_level: Some(Grade(0)),
                node_type: Some(NodeType::Core),
                description: "12 inches".to_string(),
            })
        );
        assert!(matches!(&concepts[1], ConceptEntry::Concept(c) if c.label == "Pounds"));
    }

    #[test]
    fn malformed_nodes_do_not_fail_the_load() {
        let doc = TaxonomyLoader::parse_str(
            r#"{
                "subject": "Science",
                "taxonomy": {
                    "Empty": { "grade_level": 2 },
                    "Scalar": 5,
                    "BadList": { "concepts": { "not": "a list" } },
                    "Ok": { "concepts": [ {}, { "label": "Atoms" } ] }
                }
            }"#,
        )
        .expect("load");

        let entries = nested(&doc);
        assert!(matches!(entries[0].shape, EntryShape::Malformed { .. }));
        assert!(matches!(entries[1].shape, EntryShape::Malformed { .. }));
        assert!(matches!(entries[2].shape, EntryShape::Malformed { .. }));
        let EntryShape::ConceptList { concepts, .. } = &entries[3].shape else {
            unreachable!("expected a concept list");
        };
        assert!(matches!(concepts[0], ConceptEntry::Malformed { .. }));
        assert!(matches!(concepts[1], ConceptEntry::Concept(_)));
    }

    #[test]
    fn concepts_take_precedence_over_subtopics() {
        let doc = TaxonomyLoader::parse_str(
            r#"{
                "subject": "English",
                "taxonomy": {
                    "Both": { "concepts": [ "A" ], "subtopics": { "X": { "concepts": [] } } }
                }
            }"#,
        )
        .expect("load");
        assert!(matches!(
            nested(&doc)[0].shape,
            EntryShape::ConceptList { .. }
        ));
    }

    #[test]
    fn unparseable_grade_is_treated_as_missing() {
        let doc = TaxonomyLoader::parse_str(
            r#"{ "subject": "Math", "taxonomy": { "T": { "grade_level": "someday", "concepts": [] } } }"#,
        )
        .expect("load");
        let EntryShape::ConceptList { attrs, .. } = &nested(&doc)[0].shape else {
            unreachable!("expected a concept list");
        };
        assert_eq!(attrs.grade_level, None);
    }

    #[test]
    fn parses_flat_document() {
        let doc = TaxonomyLoader::parse_str(
            r#"{
                "subject": "History",
                "nodes": [
                    { "id": "ancient", "label": "Ancient World", "grade_level": 6 },
                    { "id": "medieval", "label": "Medieval", "grade_level": 7, "prerequisites": ["ancient"] },
                    { "label": "no id" }
                ]
            }"#,
        )
        .expect("load");

        let TaxonomyBody::Flat(nodes) = &doc.body else {
            unreachable!("expected flat body");
        };
        assert_eq!(nodes.len(), 3);
        let FlatEntry::Node(medieval) = &nodes[1] else {
            unreachable!("expected node");
        };
        assert_eq!(medieval.prerequisites, vec!["ancient".to_string()]);
        assert_eq!(medieval.attrs.label.as_deref(), Some("Medieval"));
        assert!(matches!(nodes[2], FlatEntry::Malformed { .. }));
    }

    #[test]
    fn envelope_errors_are_reported() {
        assert!(matches!(
            TaxonomyLoader::parse_str("[]"),
            Err(CurriculumError::InvalidDocument(_))
        ));
        assert!(matches!(
            TaxonomyLoader::parse_str(r#"{ "taxonomy": {} }"#),
            Err(CurriculumError::InvalidDocument(_))
        ));
        assert!(matches!(
            TaxonomyLoader::parse_str(r#"{ "subject": "Math" }"#),
            Err(CurriculumError::InvalidDocument(_))
        ));
        assert!(matches!(
            TaxonomyLoader::parse_str("{ not json"),
            Err(CurriculumError::Parse(_))
        ));
    }
}
