//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for piiscan using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// piiscan - PII detection and reconciliation for document indexes
#[derive(Parser, Debug)]
#[command(name = "piiscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "piiscan.toml", env = "PIISCAN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PIISCAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an index for PII and optionally write back structured fields
    Scan(commands::scan::ScanArgs),

    /// Validate configuration file and detector definitions
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_scan() {
        let cli = Cli::parse_from(["piiscan", "scan"]);
        assert_eq!(cli.config, "piiscan.toml");
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["piiscan", "--config", "custom.toml", "scan"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["piiscan", "--log-level", "debug", "scan"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_scan_overrides() {
        let cli = Cli::parse_from([
            "piiscan",
            "scan",
            "--apply",
            "--index",
            "documents",
            "--field-map",
            "NAS=nas_norm,EMAIL=emails",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert!(args.apply);
                assert_eq!(args.index.as_deref(), Some("documents"));
                assert_eq!(
                    args.field_map.as_deref(),
                    Some("NAS=nas_norm,EMAIL=emails")
                );
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["piiscan", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["piiscan", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
