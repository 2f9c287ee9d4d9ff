//! Document scanning
//!
//! Scroll pagination, field extraction, and the coordinator that drives a
//! full run.

pub mod coordinator;
pub mod extract;
pub mod scanner;

pub use coordinator::ScanCoordinator;
pub use extract::extract_text_fields;
pub use scanner::{build_query, DocumentScanner};
