//! Match collection and deduplication
//!
//! Runs the detector registry over every extracted field of a document and
//! enforces the run's dedupe policy. The seen-key set is the only in-memory
//! collection whose size scales with the number of distinct matches across
//! the run; under global scope on a very large corpus this trades bounded
//! duplicate rows for unbounded (match-proportional) memory, a known
//! scaling limit.

use crate::core::scan::extract::extract_text_fields;
use crate::detectors::DetectorRegistry;
use crate::domain::{DedupeKey, DedupeScope, RawMatch};
use serde_json::Value;
use std::collections::HashSet;

/// Collects matches for one run
///
/// Owns the dedupe state for exactly one run: constructed at run start,
/// discarded at run end. Never share a collector between runs.
pub struct MatchCollector {
    scope: DedupeScope,
    seen: HashSet<DedupeKey>,
    suppressed: usize,
}

impl MatchCollector {
    /// Create a collector with the given dedupe scope
    pub fn new(scope: DedupeScope) -> Self {
        Self {
            scope,
            seen: HashSet::new(),
            suppressed: 0,
        }
    }

    /// The collector's dedupe scope
    pub fn scope(&self) -> DedupeScope {
        self.scope
    }

    /// Number of matches suppressed as duplicates so far
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Collect the retained matches for one document
    ///
    /// Every leaf string field of `source` is run through the registry;
    /// matches whose dedupe key was already seen in this run's scope are
    /// dropped before they reach the audit sink or reconciliation.
    pub fn collect(
        &mut self,
        document_id: &str,
        source: &Value,
        registry: &DetectorRegistry,
    ) -> Vec<RawMatch> {
        let mut retained = Vec::new();

        for (field_path, text) in extract_text_fields(source) {
            for fragment in registry.apply(&text) {
                let raw = RawMatch {
                    document_id: document_id.to_string(),
                    field_path: field_path.clone(),
                    detector_name: fragment.detector_name,
                    raw_text: fragment.raw_text,
                    normalized_text: fragment.normalized_text,
                };

                if let Some(key) = DedupeKey::for_match(&raw, self.scope) {
                    if !self.seen.insert(key) {
                        self.suppressed += 1;
                        continue;
                    }
                }

                retained.push(raw);
            }
        }

        retained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::DetectorRegistry;
    use serde_json::json;

    fn registry() -> DetectorRegistry {
        DetectorRegistry::builtin().unwrap()
    }

    #[test]
    fn test_two_occurrences_one_retained_per_document() {
        let registry = registry();
        let mut collector = MatchCollector::new(DedupeScope::PerDocument);

        let source = json!({
            "content": "contact: a.b@example.com or A.B@EXAMPLE.COM"
        });

        let matches = collector.collect("doc-1", &source, &registry);
        let emails: Vec<_> = matches
            .iter()
            .filter(|m| m.detector_name == "EMAIL")
            .collect();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].normalized_text, "a.b@example.com");
        assert_eq!(collector.suppressed(), 1);
    }

    #[test]
    fn test_per_document_scope_keeps_value_in_second_document() {
        let registry = registry();
        let mut collector = MatchCollector::new(DedupeScope::PerDocument);
        let source = json!({ "content": "a.b@example.com" });

        let first = collector.collect("doc-1", &source, &registry);
        let second = collector.collect("doc-2", &source, &registry);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_global_scope_suppresses_across_documents() {
        let registry = registry();
        let mut collector = MatchCollector::new(DedupeScope::Global);
        let source = json!({ "content": "a.b@example.com" });

        let first = collector.collect("doc-1", &source, &registry);
        let second = collector.collect("doc-2", &source, &registry);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(collector.suppressed(), 1);
    }

    #[test]
    fn test_none_scope_retains_everything() {
        let registry = registry();
        let mut collector = MatchCollector::new(DedupeScope::None);
        let source = json!({ "content": "a.b@example.com and a.b@example.com" });

        let matches = collector.collect("doc-1", &source, &registry);
        let emails = matches
            .iter()
            .filter(|m| m.detector_name == "EMAIL")
            .count();
        assert_eq!(emails, 2);
        assert_eq!(collector.suppressed(), 0);
    }

    #[test]
    fn test_field_paths_carried_through() {
        let registry = registry();
        let mut collector = MatchCollector::new(DedupeScope::PerDocument);
        let source = json!({ "attachment": { "content": "a.b@example.com" } });

        let matches = collector.collect("doc-1", &source, &registry);
        assert!(matches
            .iter()
            .any(|m| m.field_path == "attachment.content"));
    }
}
