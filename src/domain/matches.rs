//! Match and deduplication domain types
//!
//! A [`RawMatch`] is created for every substring accepted by a detector's
//! pattern (and its validator, when one is attached). It is immutable once
//! created. [`DedupeKey`] derives the identity under which matches are
//! deduplicated for a run.

use serde::Deserialize;

/// A single accepted detector match within a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Opaque document identifier from the store
    pub document_id: String,

    /// Dotted locator of the field within the document source
    pub field_path: String,

    /// Name of the detector that produced the match
    pub detector_name: String,

    /// The exact substring matched by the pattern
    pub raw_text: String,

    /// Normalized representation, or the raw text if the detector has
    /// no normalization rule
    pub normalized_text: String,
}

/// Scope of match deduplication for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupeScope {
    /// No deduplication; every accepted match is retained
    None,

    /// Deduplicate within a single document
    #[default]
    PerDocument,

    /// Deduplicate across the whole run
    Global,
}

impl DedupeScope {
    /// Parse a scope from its configuration spelling
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "none" => Ok(DedupeScope::None),
            "per-document" => Ok(DedupeScope::PerDocument),
            "global" => Ok(DedupeScope::Global),
            other => Err(format!(
                "Invalid dedupe scope '{other}'. Must be one of: none, per-document, global"
            )),
        }
    }

    /// Whether this scope deduplicates at all
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DedupeScope::None)
    }
}

/// Identity under which matches are deduplicated
///
/// Per-document scope keys on (document id, detector, normalized value);
/// global scope drops the document id so the same value is reported once
/// across the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    document_id: Option<String>,
    detector_name: String,
    normalized_text: String,
}

impl DedupeKey {
    /// Derive the dedupe key for a match under the given scope
    ///
    /// Returns `None` when the scope disables deduplication.
    pub fn for_match(raw: &RawMatch, scope: DedupeScope) -> Option<Self> {
        match scope {
            DedupeScope::None => None,
            DedupeScope::PerDocument => Some(Self {
                document_id: Some(raw.document_id.clone()),
                detector_name: raw.detector_name.clone(),
                normalized_text: raw.normalized_text.clone(),
            }),
            DedupeScope::Global => Some(Self {
                document_id: None,
                detector_name: raw.detector_name.clone(),
                normalized_text: raw.normalized_text.clone(),
            }),
        }
    }
}
