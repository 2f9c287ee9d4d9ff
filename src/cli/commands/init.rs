//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "piiscan.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing piiscan configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your index settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set PIISCAN_USERNAME and PIISCAN_PASSWORD, or");
                println!("     - Set PIISCAN_API_KEY");
                println!("  3. Validate configuration: piiscan validate-config");
                println!("  4. Run an audit-only scan: piiscan scan");
                println!("  5. Apply updates when satisfied: piiscan scan --apply");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate the starter configuration
    fn generate_config() -> String {
        r#"# piiscan Configuration File
# PII detection and reconciliation for document indexes

[index]
url = "https://localhost:9200"
name = "documents"

# Authentication: basic (username/password), api_key, or bearer_token.
# Values support ${VAR} substitution from the environment / .env file.
username = "${PIISCAN_USERNAME}"
password = "${PIISCAN_PASSWORD}"
# api_key = "${PIISCAN_API_KEY}"

# TLS settings
verify_tls = true
# ca_cert = "ca.pem"
timeout_seconds = 60
scroll_keepalive = "2m"

[index.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 30000
backoff_multiplier = 2.0

[scan]
batch_size = 500
# query_file = "query.json"
dedupe = "per-document"  # none | per-document | global

[detectors]
builtin = true
# path = "detectors.toml"

[reconcile]
apply_updates = false
bulk_size = 1000
retry_on_conflict = 3
# field_prefix = "pii."

# Route detectors to destination fields. Unrouted detectors are audited
# but never written back, unless field_prefix is set.
[reconcile.field_map]
NAS = "nas_norm"
EMAIL = "emails"

[audit]
path = "pii_matches.csv"

[logging]
level = "info"
file_enabled = false
file_path = "logs"
file_rotation = "daily"
"#
        .to_string()
    }
}
