//! Document scanner
//!
//! Pages through the full corpus of an index using the store's scroll
//! protocol. The produced sequence is single-pass and not restartable:
//! restarting a failed run re-scans from the beginning, which is safe
//! because the pipeline is idempotent.

use crate::adapters::elasticsearch::{EsClient, Hit};
use crate::domain::Result;
use serde_json::Value;
use std::sync::Arc;

/// Pages through an index via the scroll protocol
///
/// The first call to [`DocumentScanner::next_page`] opens the cursor;
/// subsequent calls continue it until an empty page or a missing scroll id
/// ends the sequence. Retry/backoff for each page fetch lives in the
/// client; once the client gives up, the retrieval error aborts the scan.
pub struct DocumentScanner {
    client: Arc<EsClient>,
    index: String,
    query: Value,
    batch_size: usize,
    scroll_id: Option<String>,
    started: bool,
    exhausted: bool,
}

impl DocumentScanner {
    /// Create a scanner for an index
    pub fn new(client: Arc<EsClient>, index: impl Into<String>, query: Value, batch_size: usize) -> Self {
        Self {
            client,
            index: index.into(),
            query,
            batch_size,
            scroll_id: None,
            started: false,
            exhausted: false,
        }
    }

    /// Fetch the next page of documents
    ///
    /// Returns `Ok(None)` once the corpus is exhausted. Errors are fatal to
    /// the scan; the cursor is released best-effort either way.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Hit>>> {
        if self.exhausted {
            return Ok(None);
        }

        let response = if !self.started {
            self.started = true;
            self.client
                .open_scroll(&self.index, &self.query, self.batch_size)
                .await?
        } else {
            match &self.scroll_id {
                Some(scroll_id) => self.client.continue_scroll(scroll_id).await?,
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        };

        self.scroll_id = response.scroll_id;
        let hits = response.hits.hits;

        if hits.is_empty() {
            self.finish().await;
            return Ok(None);
        }

        tracing::debug!(index = %self.index, count = hits.len(), "Fetched page");
        Ok(Some(hits))
    }

    /// Mark the scan finished and release the server-side cursor
    pub async fn finish(&mut self) {
        self.exhausted = true;
        if let Some(scroll_id) = self.scroll_id.take() {
            self.client.clear_scroll(&scroll_id).await;
        }
    }
}

/// Build the scroll query body
///
/// Starts from the user-supplied query (or `match_all`) and forces
/// `_source` retrieval so field extraction sees the full document body.
pub fn build_query(custom: Option<Value>) -> Value {
    let mut query = custom.unwrap_or_else(|| serde_json::json!({ "query": { "match_all": {} } }));
    if let Some(map) = query.as_object_mut() {
        map.entry("_source").or_insert(Value::Bool(true));
    }
    query
}
