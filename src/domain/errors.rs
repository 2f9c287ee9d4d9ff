//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! Configuration errors are always raised before any network call is made;
//! retrieval errors are fatal to a run; reconciliation errors are recovered
//! at document granularity and aggregated into the run summary.

use thiserror::Error;

/// Main piiscan error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PiiScanError {
    /// Configuration-related errors (bad detector, pattern, field map)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document retrieval errors (scroll/search against the index)
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Reconciliation errors (partial-update submission)
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),

    /// Audit output errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Retrieval-specific errors
///
/// Errors that occur while paging through the document store. These are
/// fatal: once retries are exhausted the run aborts, preserving any audit
/// rows already written.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Failed to connect to the document store
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Server error (4xx/5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Scroll cursor expired or was rejected by the server
    #[error("Scroll cursor expired: {0}")]
    ScrollExpired(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Reconciliation-specific errors
///
/// Errors raised while submitting additive partial updates. A single
/// document's failure is counted and reported without aborting the run.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The bulk request itself failed (transport or HTTP-level)
    #[error("Bulk update request failed: {0}")]
    BulkRequestFailed(String),

    /// A single document's update was rejected by the store
    #[error("Update failed for document {document_id}: {message}")]
    DocumentUpdateFailed {
        document_id: String,
        message: String,
    },

    /// The bulk response could not be interpreted
    #[error("Invalid bulk response: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for PiiScanError {
    fn from(err: std::io::Error) -> Self {
        PiiScanError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PiiScanError {
    fn from(err: serde_json::Error) -> Self {
        PiiScanError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PiiScanError {
    fn from(err: toml::de::Error) -> Self {
        PiiScanError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors (audit sink)
impl From<csv::Error> for PiiScanError {
    fn from(err: csv::Error) -> Self {
        PiiScanError::Audit(err.to_string())
    }
}
