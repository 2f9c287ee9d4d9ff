// piiscan - PII detection and reconciliation for document indexes
// Copyright (c) 2025 piiscan Contributors
// Licensed under the MIT License

//! # piiscan - PII detection and reconciliation
//!
//! piiscan scans every document of an Elasticsearch-compatible index for
//! personally identifiable information, writes a CSV audit trail of every
//! match, and can reconcile the normalized values back into structured,
//! set-valued document fields.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** PII with a configurable registry of regex detectors,
//!   each with optional normalization and checksum validation rules
//! - **Scanning** the full corpus of an index via scroll pagination with
//!   retry and backoff
//! - **Auditing** every retained match to a stable-schema CSV file
//! - **Reconciling** normalized values into destination fields with
//!   additive, server-side set-union updates submitted in bulk chunks
//!
//! ## Architecture
//!
//! piiscan follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (scan, collect, audit, reconcile)
//! - [`detectors`] - Detector registry, normalization and validation rules
//! - [`adapters`] - External integrations (Elasticsearch REST API)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use piiscan::config::load_config;
//! use piiscan::core::reconcile::FieldMap;
//! use piiscan::core::scan::ScanCoordinator;
//! use piiscan::detectors::DetectorRegistry;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("piiscan.toml")?;
//!     let registry = DetectorRegistry::builtin()?;
//!     let field_map = FieldMap::parse("NAS=nas_norm,EMAIL=emails")?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let coordinator = ScanCoordinator::new(config, registry, field_map, shutdown_rx)?;
//!     let summary = coordinator.execute_scan().await?;
//!
//!     println!("Found {} matches", summary.matches_found);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod detectors;
pub mod domain;
pub mod logging;
