//! Configuration schema types
//!
//! This module defines the configuration structure mapped from the TOML
//! file. Every section is validated on load, before any network call.

use crate::config::SecretString;
use crate::domain::matches::DedupeScope;
use serde::Deserialize;
use std::collections::HashMap;

/// Main piiscan configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Deserialize)]
pub struct PiiScanConfig {
    /// Document store connection
    pub index: IndexConfig,

    /// Scanning behavior
    #[serde(default)]
    pub scan: ScanConfig,

    /// Detector set selection
    #[serde(default)]
    pub detectors: DetectorsConfig,

    /// Write-back reconciliation
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Audit output
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PiiScanConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.index.validate()?;
        self.scan.validate()?;
        self.reconcile.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Document store connection configuration
#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the store (e.g. `http://localhost:9200`)
    pub url: String,

    /// Index (collection) name to scan
    pub name: String,

    /// Basic-auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Base64 api key; takes precedence over basic auth
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Bearer token; takes precedence over basic auth
    #[serde(default)]
    pub bearer_token: Option<SecretString>,

    /// Verify TLS certificates (disable for self-signed test clusters)
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Path to a PEM CA certificate trusted in addition to the system
    /// roots, for clusters with a private CA
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Scroll cursor keepalive window (e.g. `2m`)
    #[serde(default = "default_scroll_keepalive")]
    pub scroll_keepalive: String,

    /// Retry behavior for store requests
    #[serde(default)]
    pub retry: RetryConfig,
}

impl IndexConfig {
    fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("index.url must not be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(format!(
                "index.url must start with http:// or https://, got '{}'",
                self.url
            ));
        }
        if self.name.is_empty() {
            return Err("index.name must not be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("index.timeout_seconds must be greater than 0".to_string());
        }
        self.retry.validate()
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            name: String::new(),
            username: None,
            password: None,
            api_key: None,
            bearer_token: None,
            verify_tls: default_verify_tls(),
            ca_cert: None,
            timeout_seconds: default_timeout_seconds(),
            scroll_keepalive: default_scroll_keepalive(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("index.retry.max_retries must be greater than 0".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("index.retry.backoff_multiplier must be at least 1.0".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Scanning configuration
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Page size for scroll retrieval
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional JSON file with a custom query body
    #[serde(default)]
    pub query_file: Option<String>,

    /// Dedupe scope: none, per-document, or global
    #[serde(default)]
    pub dedupe: DedupeScope,
}

impl ScanConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("scan.batch_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            query_file: None,
            dedupe: DedupeScope::default(),
        }
    }
}

/// Detector set configuration
#[derive(Debug, Deserialize)]
pub struct DetectorsConfig {
    /// Include the embedded default detector set
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Optional TOML file with additional detector definitions
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            path: None,
        }
    }
}

/// Reconciliation (write-back) configuration
#[derive(Debug, Deserialize)]
pub struct ReconcileConfig {
    /// Apply updates to the store; off by default (audit-only runs)
    #[serde(default)]
    pub apply_updates: bool,

    /// Detector name to destination field mapping
    ///
    /// A detector absent from this map is audited but never written back,
    /// unless `field_prefix` is set.
    #[serde(default)]
    pub field_map: HashMap<String, String>,

    /// When set, unmapped detectors are written to `<prefix><snake_name>`
    /// (e.g. `pii.email`). Leave unset to write mapped detectors only.
    #[serde(default)]
    pub field_prefix: Option<String>,

    /// Number of document updates per bulk request
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,

    /// Optimistic-concurrency retries per update on version conflict
    #[serde(default = "default_retry_on_conflict")]
    pub retry_on_conflict: u32,
}

impl ReconcileConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bulk_size == 0 {
            return Err("reconcile.bulk_size must be greater than 0".to_string());
        }
        for (detector, field) in &self.field_map {
            if detector.is_empty() || field.is_empty() {
                return Err("reconcile.field_map entries must be non-empty".to_string());
            }
        }
        Ok(())
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            apply_updates: false,
            field_map: HashMap::new(),
            field_prefix: None,
            bulk_size: default_bulk_size(),
            retry_on_conflict: default_retry_on_conflict(),
        }
    }
}

/// Audit output configuration
#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Path of the CSV audit file
    #[serde(default = "default_audit_path")]
    pub path: String,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.is_empty() {
            return Err("audit.path must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON file logging
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for rolling log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Rotation interval: daily or hourly
    #[serde(default = "default_log_rotation")]
    pub file_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.file_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.file_rotation '{}'. Must be one of: {}",
                self.file_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            file_path: default_log_path(),
            file_rotation: default_log_rotation(),
        }
    }
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_scroll_keepalive() -> String {
    "2m".to_string()
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    500
}

fn default_bulk_size() -> usize {
    1000
}

fn default_retry_on_conflict() -> u32 {
    3
}

fn default_audit_path() -> String {
    "pii_matches.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}
