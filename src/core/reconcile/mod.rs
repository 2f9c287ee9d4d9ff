//! Update reconciliation
//!
//! Routes retained matches through the detector-to-field map and computes
//! the additive update for one document. Updates only ever add values to
//! set-valued fields; the union is computed server-side so concurrent or
//! repeated runs never lose previously appended values.

pub mod batch;

pub use batch::{BulkBuffer, FlushOutcome};

use crate::domain::{PiiScanError, RawMatch, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Mapping from detector name to destination document field
///
/// A detector absent from the map is never written back (extract-only),
/// though it is still audited. When a default prefix is set, unmapped
/// detectors fall back to `<prefix><snake_case_name>`.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    map: HashMap<String, String>,
    default_prefix: Option<String>,
}

impl FieldMap {
    /// Build a field map from explicit pairs
    pub fn new(map: HashMap<String, String>) -> Self {
        Self {
            map,
            default_prefix: None,
        }
    }

    /// Enable the prefix fallback for unmapped detectors
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = Some(prefix.into());
        self
    }

    /// Parse a comma-separated `NAME=field` list (CLI form)
    ///
    /// Example: `"NAS=nas_norm,EMAIL=emails"`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut map = HashMap::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (detector, field) = part.split_once('=').ok_or_else(|| {
                PiiScanError::Configuration(format!(
                    "Invalid field map entry '{part}': expected DETECTOR=field"
                ))
            })?;
            let detector = detector.trim();
            let field = field.trim();
            if detector.is_empty() || field.is_empty() {
                return Err(PiiScanError::Configuration(format!(
                    "Invalid field map entry '{part}': empty detector or field"
                )));
            }
            map.insert(detector.to_string(), field.to_string());
        }
        Ok(Self::new(map))
    }

    /// Whether the map routes anything at all
    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.default_prefix.is_none()
    }

    /// Destination field for a detector, or `None` for extract-only
    pub fn target_field(&self, detector_name: &str) -> Option<String> {
        if let Some(field) = self.map.get(detector_name) {
            return Some(field.clone());
        }
        self.default_prefix.as_ref().map(|prefix| {
            let snake = detector_name.to_lowercase().replace(' ', "_");
            format!("{prefix}{snake}")
        })
    }
}

/// The additive update for one document
///
/// Built transiently per document, submitted once, then discarded. Fields
/// and values are ordered for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBatch {
    /// Target document
    pub document_id: String,

    /// Normalized values to union into each destination field
    pub fields: BTreeMap<String, BTreeSet<String>>,
}

/// Compute the additive update for one document's retained matches
///
/// Groups normalized values by destination field, dropping values the
/// document already carries, so re-scanning an already-updated document
/// emits no update instruction at all. Returns `None` when nothing new
/// routes to any field. The server-side script re-checks presence anyway,
/// which keeps concurrent writers correct; this filter only avoids
/// pointless round trips.
pub fn reconcile(
    document_id: &str,
    source: &Value,
    matches: &[RawMatch],
    field_map: &FieldMap,
) -> Option<UpdateBatch> {
    let mut fields: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for raw in matches {
        if let Some(field) = field_map.target_field(&raw.detector_name) {
            if field_contains(source, &field, &raw.normalized_text) {
                continue;
            }
            fields
                .entry(field)
                .or_default()
                .insert(raw.normalized_text.clone());
        }
    }

    if fields.is_empty() {
        return None;
    }

    Some(UpdateBatch {
        document_id: document_id.to_string(),
        fields,
    })
}

/// Whether the document source already carries `value` in `field`
///
/// Destination fields are flat keys of the source object, matching the
/// server-side script's `ctx._source[f]` access. Values compare as exact
/// strings.
fn field_contains(source: &Value, field: &str, value: &str) -> bool {
    match source.get(field) {
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(value)),
        Some(Value::String(existing)) => existing == value,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(detector: &str, normalized: &str) -> RawMatch {
        RawMatch {
            document_id: "doc-1".to_string(),
            field_path: "content".to_string(),
            detector_name: detector.to_string(),
            raw_text: normalized.to_string(),
            normalized_text: normalized.to_string(),
        }
    }

    #[test]
    fn test_parse_field_map() {
        let map = FieldMap::parse("NAS=nas_norm, EMAIL=emails").unwrap();
        assert_eq!(map.target_field("NAS"), Some("nas_norm".to_string()));
        assert_eq!(map.target_field("EMAIL"), Some("emails".to_string()));
        assert_eq!(map.target_field("PHONE_CA"), None);
    }

    #[test]
    fn test_parse_rejects_malformed_entry() {
        assert!(FieldMap::parse("NAS").is_err());
        assert!(FieldMap::parse("NAS=").is_err());
    }

    #[test]
    fn test_default_prefix_for_unmapped_detectors() {
        let map = FieldMap::default().with_default_prefix("pii.");
        assert_eq!(map.target_field("EMAIL"), Some("pii.email".to_string()));
    }

    #[test]
    fn test_explicit_mapping_wins_over_prefix() {
        let mut pairs = HashMap::new();
        pairs.insert("EMAIL".to_string(), "emails".to_string());
        let map = FieldMap::new(pairs).with_default_prefix("pii.");
        assert_eq!(map.target_field("EMAIL"), Some("emails".to_string()));
        assert_eq!(map.target_field("URL_HTTP"), Some("pii.url_http".to_string()));
    }

    #[test]
    fn test_reconcile_groups_by_target_field() {
        let map = FieldMap::parse("URL_HTTP=urls,URL_WWW=urls,EMAIL=emails").unwrap();
        let matches = vec![
            raw("URL_HTTP", "https://a.example"),
            raw("URL_WWW", "www.b.example"),
            raw("EMAIL", "a@example.com"),
        ];

        let batch = reconcile("doc-1", &serde_json::json!({}), &matches, &map).unwrap();
        assert_eq!(batch.fields.len(), 2);
        assert_eq!(batch.fields["urls"].len(), 2);
        assert_eq!(batch.fields["emails"].len(), 1);
    }

    #[test]
    fn test_reconcile_collapses_duplicate_values() {
        let map = FieldMap::parse("PHONE_CA=phones").unwrap();
        let matches = vec![raw("PHONE_CA", "5145550000"), raw("PHONE_CA", "5145550000")];

        let batch = reconcile("doc-1", &serde_json::json!({}), &matches, &map).unwrap();
        assert_eq!(batch.fields["phones"].len(), 1);
    }

    #[test]
    fn test_unmapped_detectors_produce_no_update() {
        let map = FieldMap::parse("NAS=nas_norm").unwrap();
        let matches = vec![raw("EMAIL", "a@example.com")];
        assert!(reconcile("doc-1", &serde_json::json!({}), &matches, &map).is_none());
    }

    #[test]
    fn test_empty_matches_produce_no_update() {
        let map = FieldMap::parse("NAS=nas_norm").unwrap();
        assert!(reconcile("doc-1", &serde_json::json!({}), &[], &map).is_none());
    }

    #[test]
    fn test_already_present_values_emit_no_update() {
        let map = FieldMap::parse("PHONE_CA=phones").unwrap();
        let source = serde_json::json!({ "phones": ["5145550000"] });
        let matches = vec![raw("PHONE_CA", "5145550000")];

        assert!(reconcile("doc-1", &source, &matches, &map).is_none());
    }

    #[test]
    fn test_distinct_values_still_routed_alongside_present_ones() {
        let map = FieldMap::parse("PHONE_CA=phones").unwrap();
        let source = serde_json::json!({ "phones": ["5145550000"] });
        let matches = vec![raw("PHONE_CA", "5145550000"), raw("PHONE_CA", "5145550001")];

        let batch = reconcile("doc-1", &source, &matches, &map).unwrap();
        assert_eq!(batch.fields["phones"].len(), 1);
        assert!(batch.fields["phones"].contains("5145550001"));
    }

    #[test]
    fn test_scalar_field_value_counts_as_present() {
        let map = FieldMap::parse("EMAIL=email").unwrap();
        let source = serde_json::json!({ "email": "a@example.com" });
        let matches = vec![raw("EMAIL", "a@example.com")];

        assert!(reconcile("doc-1", &source, &matches, &map).is_none());
    }
}
