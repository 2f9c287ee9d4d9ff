//! Validate config command implementation
//!
//! This module implements the `validate-config` command: load and validate
//! the configuration file, compile the detector set, and build the field
//! map, without touching the network.

use crate::cli::commands::{build_field_map, build_registry};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(2);
        }

        // Compile the detector set so pattern errors surface here, not
        // mid-scan
        let registry = match build_registry(&config.detectors) {
            Ok(r) => {
                println!("✅ Detector set compiled ({} detectors)", r.len());
                r
            }
            Err(e) => {
                println!("❌ Detector set is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let field_map = match build_field_map(&config.reconcile, None) {
            Ok(m) => m,
            Err(e) => {
                println!("❌ Field map is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Index URL: {}", config.index.url);
        println!("  Index: {}", config.index.name);
        println!("  TLS verification: {}", config.index.verify_tls);
        println!("  Batch size: {}", config.scan.batch_size);
        println!("  Dedupe: {:?}", config.scan.dedupe);
        println!("  Detectors: {}", registry.len());
        for detector in registry.detectors() {
            let target = field_map
                .target_field(&detector.name)
                .unwrap_or_else(|| "(audit only)".to_string());
            println!("    {} -> {}", detector.name, target);
        }
        println!("  Apply updates: {}", config.reconcile.apply_updates);
        println!("  Bulk size: {}", config.reconcile.bulk_size);
        println!("  Audit output: {}", config.audit.path);
        println!();
        Ok(0)
    }
}
