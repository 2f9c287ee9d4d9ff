//! Configuration management for piiscan.
//!
//! TOML-based configuration with environment variable substitution
//! (`${VAR_NAME}`), `PIISCAN_*` overrides, defaults for optional settings,
//! and validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! [index]
//! url = "https://es.example.com:9200"
//! name = "documents"
//! username = "elastic"
//! password = "${PIISCAN_ES_PASSWORD}"
//! verify_tls = false
//!
//! [scan]
//! batch_size = 500
//! dedupe = "per-document"
//!
//! [reconcile]
//! apply_updates = true
//! bulk_size = 1000
//!
//! [reconcile.field_map]
//! NAS = "nas_norm"
//! EMAIL = "emails"
//!
//! [audit]
//! path = "pii_matches.csv"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AuditConfig, DetectorsConfig, IndexConfig, LoggingConfig, PiiScanConfig, ReconcileConfig,
    RetryConfig, ScanConfig,
};
pub use secret::{SecretString, SecretValue};
