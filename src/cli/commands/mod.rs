//! CLI command implementations
//!
//! This module contains all CLI command implementations, plus the shared
//! helpers that turn validated configuration into runtime objects.

pub mod init;
pub mod scan;
pub mod validate;

use crate::config::{DetectorsConfig, ReconcileConfig};
use crate::core::reconcile::FieldMap;
use crate::detectors::{DetectorDefinition, DetectorRegistry};
use crate::domain::{PiiScanError, Result};

/// Build the detector registry from configuration
///
/// Custom definitions replace a builtin detector with the same name and
/// extend the set otherwise. Disabling builtins with no custom file is a
/// configuration error because the registry would be empty.
pub fn build_registry(config: &DetectorsConfig) -> Result<DetectorRegistry> {
    let mut definitions: Vec<DetectorDefinition> = if config.builtin {
        DetectorRegistry::builtin_definitions()?
    } else {
        Vec::new()
    };

    if let Some(path) = &config.path {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PiiScanError::Configuration(format!("Failed to read detector file {path}: {e}"))
        })?;
        for custom in DetectorRegistry::definitions_from_toml(&contents)? {
            if let Some(existing) = definitions.iter_mut().find(|d| d.name == custom.name) {
                *existing = custom;
            } else {
                definitions.push(custom);
            }
        }
    }

    if definitions.is_empty() {
        return Err(PiiScanError::Configuration(
            "No detectors configured: builtins disabled and no detector file given".to_string(),
        ));
    }

    DetectorRegistry::load(definitions)
}

/// Build the detector-to-field map from configuration
///
/// A CLI `NAME=field,...` string takes precedence over the config table;
/// the prefix fallback applies either way.
pub fn build_field_map(config: &ReconcileConfig, cli_override: Option<&str>) -> Result<FieldMap> {
    let mut field_map = match cli_override {
        Some(s) => FieldMap::parse(s)?,
        None => FieldMap::new(config.field_map.clone()),
    };
    if let Some(prefix) = &config.field_prefix {
        field_map = field_map.with_default_prefix(prefix.clone());
    }
    Ok(field_map)
}
