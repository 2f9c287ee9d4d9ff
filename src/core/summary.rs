//! Run summary and reporting

use std::time::Duration;

/// Type of error recorded during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorType {
    /// Fatal retrieval failure (run aborted)
    Retrieval,
    /// Per-document reconciliation failure (run continued)
    Reconciliation,
    /// Audit output failure
    Audit,
    /// Anything else
    Unknown,
}

/// Error with context recorded in the summary
#[derive(Debug, Clone)]
pub struct ScanError {
    /// Type of error
    pub error_type: ScanErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. document id)
    pub context: Option<String>,
}

impl ScanError {
    /// Create a new scan error
    pub fn new(error_type: ScanErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Summary of one scan run
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Documents retrieved and processed
    pub documents_scanned: usize,

    /// Matches retained (post-dedupe) and audited
    pub matches_found: usize,

    /// Matches suppressed by deduplication
    pub duplicates_suppressed: usize,

    /// Document updates applied
    pub updates_applied: usize,

    /// Document updates that failed
    pub updates_failed: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Errors recorded during the run
    pub errors: Vec<ScanError>,

    /// The run was aborted by a fatal retrieval failure
    pub aborted: bool,

    /// The run was interrupted by a shutdown signal
    pub interrupted: bool,
}

impl ScanSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record an error
    pub fn add_error(&mut self, error: ScanError) {
        self.errors.push(error);
    }

    /// Whether the run finished with no failures
    pub fn is_successful(&self) -> bool {
        !self.aborted && self.updates_failed == 0 && self.errors.is_empty()
    }

    /// Process exit code for this run
    ///
    /// 0 on full success, 1 when reconciliation failures occurred, 4 when
    /// retrieval aborted the run, 130 when interrupted by a signal.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.aborted {
            4
        } else if self.updates_failed > 0 {
            1
        } else if self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            documents_scanned = self.documents_scanned,
            matches_found = self.matches_found,
            duplicates_suppressed = self.duplicates_suppressed,
            updates_applied = self.updates_applied,
            updates_failed = self.updates_failed,
            duration_secs = self.duration.as_secs(),
            aborted = self.aborted,
            "Scan completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Scan completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Scan error"
                );
            }
        }
    }
}
