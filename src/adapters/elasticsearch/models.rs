//! Wire models for the Elasticsearch REST API
//!
//! Only the fields the scanner and reconciliation engine actually consume
//! are modeled; everything else in the responses is ignored.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Response to `_search?scroll=` and `_search/scroll` requests
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Server-issued continuation token; absent on stores that have
    /// exhausted the cursor
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,

    /// Hits envelope
    pub hits: HitsEnvelope,
}

/// The `hits` envelope of a search response
#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    /// Documents on this page
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// A single document hit
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    /// Opaque document identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Document source body; may be absent when `_source` is filtered out
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Response to a `_bulk` request
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    /// True when at least one item failed
    #[serde(default)]
    pub errors: bool,

    /// Per-item results, keyed by action name (`update`, `index`, ...)
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItemResult>>,
}

/// Result of one bulk item
#[derive(Debug, Deserialize)]
pub struct BulkItemResult {
    /// Document the item targeted
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    /// HTTP-like status for the item
    #[serde(default)]
    pub status: u16,

    /// Error detail when the item failed
    #[serde(default)]
    pub error: Option<Value>,
}

impl BulkResponse {
    /// Collect the (document id, error message) pairs of failed items
    pub fn failed_items(&self) -> Vec<(String, String)> {
        let mut failed = Vec::new();
        for item in &self.items {
            for result in item.values() {
                if let Some(error) = &result.error {
                    let id = result.id.clone().unwrap_or_else(|| "<unknown>".to_string());
                    failed.push((id, error.to_string()));
                }
            }
        }
        failed
    }
}
