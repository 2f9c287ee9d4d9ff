//! Core pipeline
//!
//! The stages of a run: scan the index, collect and dedupe matches, write
//! the audit trail, reconcile matches into structured fields, and report
//! the summary.

pub mod audit;
pub mod collect;
pub mod reconcile;
pub mod scan;
pub mod summary;
