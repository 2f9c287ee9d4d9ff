//! Scan coordinator - main orchestrator for a run
//!
//! Drives the pipeline: scroll pages from the store, collect matches per
//! document, append audit rows, and (when enabled) buffer and submit
//! additive updates. Strictly sequential: one page at a time, one document
//! at a time. A fatal retrieval failure aborts the run but the audit file
//! is flushed first; reconciliation failures are counted per document and
//! the run continues.

use crate::adapters::elasticsearch::EsClient;
use crate::config::PiiScanConfig;
use crate::core::audit::AuditSink;
use crate::core::collect::MatchCollector;
use crate::core::reconcile::{reconcile, BulkBuffer, FieldMap};
use crate::core::scan::scanner::{build_query, DocumentScanner};
use crate::core::summary::{ScanError, ScanErrorType, ScanSummary};
use crate::detectors::DetectorRegistry;
use crate::domain::{PiiScanError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Scan coordinator
pub struct ScanCoordinator {
    config: PiiScanConfig,
    client: Arc<EsClient>,
    registry: DetectorRegistry,
    field_map: FieldMap,
    query: serde_json::Value,
    shutdown: watch::Receiver<bool>,
}

impl ScanCoordinator {
    /// Create a coordinator from validated configuration
    ///
    /// Builds the store client and reads the optional query file. All
    /// failures here are configuration errors raised before any network
    /// call.
    pub fn new(
        config: PiiScanConfig,
        registry: DetectorRegistry,
        field_map: FieldMap,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let client = Arc::new(EsClient::new(&config.index)?);

        let custom_query = match &config.scan.query_file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    PiiScanError::Configuration(format!("Failed to read query file {path}: {e}"))
                })?;
                Some(serde_json::from_str(&contents).map_err(|e| {
                    PiiScanError::Configuration(format!("Invalid query JSON in {path}: {e}"))
                })?)
            }
            None => None,
        };
        let query = build_query(custom_query);

        Ok(Self {
            config,
            client,
            registry,
            field_map,
            query,
            shutdown,
        })
    }

    /// Execute the scan
    ///
    /// Always returns a summary; fatal retrieval failures are recorded in
    /// it (`aborted`) rather than propagated, so the caller can print the
    /// partial counts and derive the exit code.
    pub async fn execute_scan(&self) -> Result<ScanSummary> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::new();

        let mut sink = AuditSink::create(&self.config.audit.path)?;
        let mut scanner = DocumentScanner::new(
            self.client.clone(),
            self.config.index.name.clone(),
            self.query.clone(),
            self.config.scan.batch_size,
        );
        let mut collector = MatchCollector::new(self.config.scan.dedupe);
        let deduped_flag = self.config.scan.dedupe.is_enabled();

        let mut buffer = if self.config.reconcile.apply_updates {
            Some(BulkBuffer::new(
                self.config.index.name.clone(),
                self.config.reconcile.bulk_size,
                self.config.reconcile.retry_on_conflict,
            ))
        } else {
            None
        };

        tracing::info!(
            index = %self.config.index.name,
            detectors = self.registry.len(),
            apply_updates = buffer.is_some(),
            "Starting scan"
        );

        loop {
            if *self.shutdown.borrow() {
                tracing::info!("Shutdown signal received, finishing current chunk");
                summary.interrupted = true;
                break;
            }

            let hits = match scanner.next_page().await {
                Ok(Some(hits)) => hits,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Retrieval failed, aborting run");
                    summary.aborted = true;
                    summary.add_error(ScanError::new(ScanErrorType::Retrieval, e.to_string()));
                    break;
                }
            };

            for hit in hits {
                summary.documents_scanned += 1;

                let matches = collector.collect(&hit.id, &hit.source, &self.registry);
                if matches.is_empty() {
                    continue;
                }

                for raw in &matches {
                    sink.emit(raw, deduped_flag)?;
                }
                summary.matches_found += matches.len();

                if let Some(buffer) = buffer.as_mut() {
                    if let Some(batch) = reconcile(&hit.id, &hit.source, &matches, &self.field_map) {
                        buffer.push(&batch)?;
                        if buffer.is_full() {
                            Self::flush_updates(&self.client, buffer, &mut summary).await;
                        }
                    }
                }
            }

            // Keep the audit file valid after every page, not just at exit
            sink.flush()?;
        }

        // Final chunk: flushed on every exit path, including interrupt and
        // retrieval abort, since the buffered updates are additive and safe
        if let Some(buffer) = buffer.as_mut() {
            Self::flush_updates(&self.client, buffer, &mut summary).await;
        }

        scanner.finish().await;
        sink.flush()?;

        summary.duplicates_suppressed = collector.suppressed();
        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        tracing::info!(
            audit_path = %sink.path().display(),
            rows = sink.rows_written(),
            "Audit output written"
        );

        Ok(summary)
    }

    /// Submit the buffered updates, decomposing failures per document
    async fn flush_updates(client: &EsClient, buffer: &mut BulkBuffer, summary: &mut ScanSummary) {
        let pending = buffer.pending();
        if pending == 0 {
            return;
        }

        match buffer.flush(client).await {
            Ok(outcome) => {
                summary.updates_applied += outcome.applied;
                summary.updates_failed += outcome.failed.len();
                for (doc_id, message) in outcome.failed {
                    summary.add_error(
                        ScanError::new(ScanErrorType::Reconciliation, message)
                            .with_context(format!("doc_id={doc_id}")),
                    );
                }
            }
            Err(e) => {
                // Transport-level chunk failure: every document in the
                // chunk is counted failed and the run continues
                tracing::error!(error = %e, pending = pending, "Bulk chunk submission failed");
                summary.updates_failed += pending;
                summary.add_error(ScanError::new(ScanErrorType::Reconciliation, e.to_string()));
                buffer.clear();
            }
        }
    }
}
