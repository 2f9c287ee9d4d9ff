//! Bulk submission of additive updates
//!
//! Buffers update instructions and submits them in chunks of `bulk_size`
//! documents per `_bulk` round trip. Chunking is a throughput optimization
//! only: item-level errors decompose to per-document failures, never an
//! all-or-nothing batch failure.

use crate::adapters::elasticsearch::EsClient;
use crate::domain::Result;
use serde_json::json;

use super::UpdateBatch;

/// Server-side append-if-absent script
///
/// The union is computed in the store, not the client, so concurrent
/// writers cannot lose values through read-modify-write races. Values are
/// compared as exact strings; distinct normalized strings are all kept.
const APPEND_IF_ABSENT_SCRIPT: &str = "\
def up = params.upd; \
for (entry in up.entrySet()) { \
  def f = entry.getKey(); \
  def vals = entry.getValue(); \
  if (ctx._source[f] == null) { ctx._source[f] = new ArrayList(); } \
  for (v in vals) { \
    if (!ctx._source[f].contains(v)) { ctx._source[f].add(v); } \
  } \
}";

/// Outcome of flushing one chunk of updates
#[derive(Debug, Default)]
pub struct FlushOutcome {
    /// Documents whose update was applied
    pub applied: usize,

    /// Documents whose update was rejected, with the store's error message
    pub failed: Vec<(String, String)>,
}

/// NDJSON buffer of pending update actions
pub struct BulkBuffer {
    index: String,
    bulk_size: usize,
    retry_on_conflict: u32,
    lines: Vec<String>,
    pending_documents: usize,
}

impl BulkBuffer {
    /// Create a buffer for updates against one index
    pub fn new(index: impl Into<String>, bulk_size: usize, retry_on_conflict: u32) -> Self {
        Self {
            index: index.into(),
            bulk_size,
            retry_on_conflict,
            lines: Vec::new(),
            pending_documents: 0,
        }
    }

    /// Number of buffered document updates
    pub fn pending(&self) -> usize {
        self.pending_documents
    }

    /// Whether the buffer has reached the configured chunk size
    pub fn is_full(&self) -> bool {
        self.pending_documents >= self.bulk_size
    }

    /// Drop the buffered updates without submitting them
    ///
    /// Used after a transport-level chunk failure, once every pending
    /// document has been counted as failed.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.pending_documents = 0;
    }

    /// Queue one document's additive update
    pub fn push(&mut self, batch: &UpdateBatch) -> Result<()> {
        let header = json!({
            "update": {
                "_index": self.index,
                "_id": batch.document_id,
                "retry_on_conflict": self.retry_on_conflict,
            }
        });
        let body = json!({
            "script": {
                "lang": "painless",
                "source": APPEND_IF_ABSENT_SCRIPT,
                "params": { "upd": batch.fields },
            }
        });

        self.lines.push(serde_json::to_string(&header)?);
        self.lines.push(serde_json::to_string(&body)?);
        self.pending_documents += 1;
        Ok(())
    }

    /// Submit the buffered updates and decompose the result per document
    ///
    /// An empty buffer is a no-op. The buffer is cleared whether or not
    /// individual items failed; a transport-level error leaves the buffer
    /// intact and surfaces as a reconciliation error for the whole chunk.
    pub async fn flush(&mut self, client: &EsClient) -> Result<FlushOutcome> {
        if self.lines.is_empty() {
            return Ok(FlushOutcome::default());
        }

        let ndjson = self.lines.join("\n") + "\n";
        let submitted = self.pending_documents;

        let response = client.bulk(ndjson).await?;

        self.lines.clear();
        self.pending_documents = 0;

        let failed = response.failed_items();
        let outcome = FlushOutcome {
            applied: submitted - failed.len(),
            failed,
        };

        if !outcome.failed.is_empty() {
            tracing::warn!(
                failed = outcome.failed.len(),
                submitted = submitted,
                "Bulk chunk completed with item failures"
            );
        } else {
            tracing::debug!(applied = outcome.applied, "Bulk chunk applied");
        }

        Ok(outcome)
    }
}
