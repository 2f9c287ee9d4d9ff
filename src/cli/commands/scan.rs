//! Scan command implementation
//!
//! This module implements the `scan` command: run the detectors over the
//! configured index, write the audit CSV, and optionally apply additive
//! updates back to the store.

use crate::cli::commands::{build_field_map, build_registry};
use crate::config::load_config;
use crate::core::scan::ScanCoordinator;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Apply updates to the store (overrides reconcile.apply_updates)
    #[arg(long)]
    pub apply: bool,

    /// Force audit-only mode even if the config enables updates
    #[arg(long, conflicts_with = "apply")]
    pub dry_run: bool,

    /// Override the index to scan
    #[arg(long)]
    pub index: Option<String>,

    /// Override the audit CSV output path
    #[arg(long)]
    pub out: Option<String>,

    /// Override the detector-to-field map (comma-separated NAME=field)
    #[arg(long)]
    pub field_map: Option<String>,

    /// Override dedupe scope (none, per-document, global)
    #[arg(long)]
    pub dedupe: Option<String>,

    /// Path to a TOML file with additional detector definitions
    #[arg(long)]
    pub detectors: Option<String>,

    /// Override documents per scroll page
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Path to a JSON file with a custom search query
    #[arg(long)]
    pub query_file: Option<String>,

    /// Path to a PEM CA certificate for clusters with a private CA
    #[arg(long)]
    pub ca_cert: Option<String>,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting scan command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(index) = &self.index {
            tracing::info!(index = %index, "Overriding index from CLI");
            config.index.name = index.clone();
        }
        if let Some(out) = &self.out {
            tracing::info!(path = %out, "Overriding audit path from CLI");
            config.audit.path = out.clone();
        }
        if let Some(dedupe) = &self.dedupe {
            match crate::domain::DedupeScope::parse(dedupe) {
                Ok(scope) => config.scan.dedupe = scope,
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    return Ok(2);
                }
            }
        }
        if let Some(detectors) = &self.detectors {
            config.detectors.path = Some(detectors.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.scan.batch_size = batch_size;
        }
        if let Some(query_file) = &self.query_file {
            config.scan.query_file = Some(query_file.clone());
        }
        if let Some(ca_cert) = &self.ca_cert {
            config.index.ca_cert = Some(ca_cert.clone());
        }
        if self.apply {
            tracing::info!("Enabling updates from CLI");
            config.reconcile.apply_updates = true;
        }
        if self.dry_run {
            config.reconcile.apply_updates = false;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        // Build the detector registry and field map before any network call
        let registry = match build_registry(&config.detectors) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build detector registry");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        let field_map = match build_field_map(&config.reconcile, self.field_map.as_deref()) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if config.reconcile.apply_updates && field_map.is_empty() {
            eprintln!(
                "Configuration error: updates enabled but no field map or prefix configured"
            );
            return Ok(2);
        }

        if !config.reconcile.apply_updates {
            println!("🔍 AUDIT-ONLY MODE - No updates will be written to the index");
            println!();
        }

        // Confirmation prompt before mutating the index (unless --yes)
        if config.reconcile.apply_updates && !self.yes {
            println!("Scan Configuration:");
            println!("  Index: {}", config.index.name);
            println!("  Detectors: {}", registry.len());
            println!("  Dedupe: {:?}", config.scan.dedupe);
            println!("  Audit output: {}", config.audit.path);
            println!("  Bulk size: {}", config.reconcile.bulk_size);
            println!();
            print!("Apply updates to the index? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Scan cancelled.");
                return Ok(0);
            }
        }

        // Create scan coordinator
        tracing::info!("Creating scan coordinator");
        let audit_path = config.audit.path.clone();
        let coordinator = match ScanCoordinator::new(config, registry, field_map, shutdown_signal)
        {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create scan coordinator");
                eprintln!("Failed to initialize scan: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Starting scan...");
        println!();

        let summary = match coordinator.execute_scan().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Scan failed");
                eprintln!("Scan failed: {e}");
                return Ok(5);
            }
        };

        // Display summary
        println!();
        println!("📊 Scan Summary:");
        println!("  Documents scanned: {}", summary.documents_scanned);
        println!("  Matches found: {}", summary.matches_found);
        println!(
            "  Duplicates suppressed: {}",
            summary.duplicates_suppressed
        );
        println!("  Updates applied: {}", summary.updates_applied);
        println!("  Updates failed: {}", summary.updates_failed);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Audit output: {audit_path}");
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in summary.errors.iter().take(10) {
                println!("  - {:?}: {}", error.error_type, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            if summary.errors.len() > 10 {
                println!("  ... and {} more errors", summary.errors.len() - 10);
            }
            println!();
        }

        if summary.interrupted {
            println!("⚠️  Scan interrupted gracefully. Audit output is complete up to");
            println!("   the last finished page; re-running is safe.");
        } else if summary.aborted {
            println!("❌ Scan aborted: the index could not be read to completion.");
        } else if summary.is_successful() {
            println!("✅ Scan completed successfully!");
        } else {
            println!("⚠️  Scan completed with failures");
        }

        Ok(summary.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_args_defaults() {
        let args = ScanArgs {
            yes: false,
            apply: false,
            dry_run: false,
            index: None,
            out: None,
            field_map: None,
            dedupe: None,
            detectors: None,
            batch_size: None,
            query_file: None,
            ca_cert: None,
        };

        assert!(!args.yes);
        assert!(!args.apply);
        assert!(args.index.is_none());
        assert!(args.field_map.is_none());
    }
}
