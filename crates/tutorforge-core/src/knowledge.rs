//! Knowledge base loader: a merged mapping from error-class identifier to
//! pedagogical metadata, assembled at startup from every knowledge file in a
//! data directory.
//!
//! Two file shapes are recognized (see component design): a *priority
//! dictionary* whose top-level keys are `priority_N` buckets of entries, and
//! a *flat citation index* whose top-level keys are error types directly.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::model::KnowledgeEntry;

/// The assembled knowledge base: a lookup by error type plus an ordered
/// pattern catalog for the priority analyzer.
#[derive(Debug, Default, Clone)]
pub struct KnowledgeBase {
    by_type: HashMap<String, KnowledgeEntry>,
    catalog: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn lookup(&self, error_type: &str) -> Option<&KnowledgeEntry> {
        self.by_type.get(error_type)
    }

    /// Patterned entries in insertion order, for the priority analyzer's
    /// lowest-priority-wins / catalog-order-tiebreak scan.
    pub fn catalog(&self) -> &[KnowledgeEntry] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Looks up an entry, degrading gracefully to the documented defaults
    /// when nothing was loaded for this error type.
    pub fn lookup_or_default(&self, error_type: &str) -> KnowledgeEntry {
        self.lookup(error_type).cloned().unwrap_or_else(|| KnowledgeEntry {
            error_type: error_type.to_string(),
            priority: 3,
            pattern: None,
            concept: "Unknown Error".to_string(),
            hint_template: "Explain the error clearly.".to_string(),
            citation: "General Concept".to_string(),
        })
    }

    fn upsert_full(&mut self, entry: KnowledgeEntry) {
        self.by_type.insert(entry.error_type.clone(), entry.clone());
        self.catalog.push(entry);
    }

    fn overlay_partial(&mut self, error_type: &str, partial: PartialFields) {
        let entry = self
            .by_type
            .entry(error_type.to_string())
            .or_insert_with(|| KnowledgeEntry {
                error_type: error_type.to_string(),
                priority: 3,
                pattern: None,
                concept: "Unknown Error".to_string(),
                hint_template: "Explain the error clearly.".to_string(),
                citation: "General Concept".to_string(),
            });
        if let Some(citation) = partial.citation {
            entry.citation = citation;
        }
        if let Some(concept) = partial.concept {
            entry.concept = concept;
        }
        if let Some(hint_template) = partial.hint_template {
            entry.hint_template = hint_template;
        }
    }

    /// Loads every `.json` file directly under `dir` and deep-merges them in
    /// directory order. Missing or unreadable files are a hard error; a file
    /// that parses as neither recognized shape is skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut kb = KnowledgeBase::default();
        if !dir.is_dir() {
            return Ok(kb);
        }

        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read knowledge directory: {}", dir.display()))?
            .collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.path());

        for entry in entries {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                kb.load_file(&path)?;
            }
        }
        Ok(kb)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read knowledge file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse knowledge file: {}", path.display()))?;
        self.merge_value(value);
        Ok(())
    }

    pub(crate) fn merge_value(&mut self, value: Value) {
        let Value::Object(map) = value else {
            return;
        };
        for (key, entry_value) in map {
            if key.starts_with("priority_") {
                if let Value::Array(items) = entry_value {
                    for item in items {
                        if let Ok(entry) = serde_json::from_value::<KnowledgeEntry>(item) {
                            self.upsert_full(entry);
                        }
                    }
                }
            } else if let Ok(partial) = serde_json::from_value::<PartialFields>(entry_value) {
                if !partial.is_empty() {
                    self.overlay_partial(&key, partial);
                }
            }
        }
    }
}

/// Strict about unknown fields so a `Problem` or `Session` record sitting
/// in the same data directory never parses as a phantom overlay entry
/// (`merge_value` below only calls this on values already excluded from
/// the priority-dictionary shape).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialFields {
    #[serde(default)]
    citation: Option<String>,
    #[serde(default)]
    concept: Option<String>,
    #[serde(default)]
    hint_template: Option<String>,
}

impl PartialFields {
    fn is_empty(&self) -> bool {
        self.citation.is_none() && self.concept.is_none() && self.hint_template.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_dictionary_entries_populate_catalog_and_map() {
        let mut kb = KnowledgeBase::default();
        kb.merge_value(serde_json::json!({
            "priority_1": [
                {"type": "MISSING_SCANF", "priority": 1, "pattern": "warning: .*scanf", "concept": "Input handling", "hint_template": "Check your scanf format string.", "citation": "C input/output"}
            ]
        }));
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.catalog().len(), 1);
        let entry = kb.lookup("MISSING_SCANF").unwrap();
        assert_eq!(entry.priority, 1);
        assert_eq!(entry.concept, "Input handling");
    }

    #[test]
    fn flat_citation_index_overlays_without_clobbering_unset_fields() {
        let mut kb = KnowledgeBase::default();
        kb.merge_value(serde_json::json!({
            "priority_2": [
                {"type": "RUNTIME_ERROR", "priority": 2, "pattern": "Segmentation", "concept": "Pointers", "hint_template": "Check null derefs.", "citation": "orig"}
            ]
        }));
        kb.merge_value(serde_json::json!({
            "RUNTIME_ERROR": {"citation": "Chapter 4: Pointers"}
        }));
        let entry = kb.lookup("RUNTIME_ERROR").unwrap();
        assert_eq!(entry.citation, "Chapter 4: Pointers");
        assert_eq!(entry.concept, "Pointers");
    }

    #[test]
    fn unknown_type_degrades_to_documented_defaults() {
        let kb = KnowledgeBase::default();
        let entry = kb.lookup_or_default("TYPE_ERROR");
        assert_eq!(entry.concept, "Unknown Error");
        assert_eq!(entry.hint_template, "Explain the error clearly.");
        assert_eq!(entry.citation, "General Concept");
    }

    #[test]
    fn merge_is_commutative_on_disjoint_keys() {
        let mut a = KnowledgeBase::default();
        a.merge_value(serde_json::json!({"priority_1": [{"type": "A", "priority": 1}]}));
        a.merge_value(serde_json::json!({"priority_2": [{"type": "B", "priority": 2}]}));

        let mut b = KnowledgeBase::default();
        b.merge_value(serde_json::json!({"priority_2": [{"type": "B", "priority": 2}]}));
        b.merge_value(serde_json::json!({"priority_1": [{"type": "A", "priority": 1}]}));

        assert_eq!(a.len(), b.len());
        assert!(a.lookup("A").is_some() && b.lookup("A").is_some());
        assert!(a.lookup("B").is_some() && b.lookup("B").is_some());
    }

    #[test]
    fn load_dir_merges_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a_error_dictionary.json"),
            serde_json::json!({"priority_1": [{"type": "SYNTAX_ERROR", "priority": 1}]}).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b_lab_manual_index.json"),
            serde_json::json!({"SYNTAX_ERROR": {"citation": "Section 1.2"}}).to_string(),
        )
        .unwrap();

        let kb = KnowledgeBase::load_dir(dir.path()).unwrap();
        let entry = kb.lookup("SYNTAX_ERROR").unwrap();
        assert_eq!(entry.citation, "Section 1.2");
    }
}
