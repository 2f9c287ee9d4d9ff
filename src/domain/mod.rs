//! Domain models and types for piiscan.
//!
//! The domain layer provides:
//! - **Match types** ([`RawMatch`], [`DedupeKey`], [`DedupeScope`])
//! - **Error types** ([`PiiScanError`], [`RetrievalError`], [`ReconciliationError`])
//! - **Result type alias** ([`Result`])
//!
//! All fallible operations return [`Result<T, PiiScanError>`]:
//!
//! ```rust
//! use piiscan::domain::{PiiScanError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(PiiScanError::Configuration("bad pattern".to_string()))
//! }
//! ```

pub mod errors;
pub mod matches;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{PiiScanError, ReconciliationError, RetrievalError};
pub use matches::{DedupeKey, DedupeScope, RawMatch};
pub use result::Result;
