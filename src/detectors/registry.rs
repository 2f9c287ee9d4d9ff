//! Detector registry
//!
//! Loads detector definitions from TOML, compiles every pattern once, and
//! applies the full detector set to text values. Within one detector the
//! matches are the regex engine's leftmost non-overlapping matches; across
//! detectors the same substring may be reported independently by several
//! detectors, which is intentional.

use crate::detectors::rules::{normalize_separators, NormalizeRule, ValidateRule};
use crate::domain::{PiiScanError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Detector definition as it appears in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorDefinition {
    /// Unique detector name (e.g. `NAS`, `EMAIL`)
    pub name: String,

    /// Regex pattern string
    pub pattern: String,

    /// Optional normalize rule identifier (see [`NormalizeRule`])
    #[serde(default)]
    pub normalize: Option<String>,

    /// Optional validate rule identifier (see [`ValidateRule`])
    #[serde(default)]
    pub validate: Option<String>,

    /// Free-form description for humans
    #[serde(default)]
    pub description: String,
}

/// TOML container for an ordered list of detector definitions
#[derive(Debug, Deserialize)]
struct DetectorLibrary {
    #[serde(default)]
    detectors: Vec<DetectorDefinition>,
}

/// A compiled detector
#[derive(Debug, Clone)]
pub struct DetectorSpec {
    /// Unique detector name
    pub name: String,

    /// Compiled pattern
    pub pattern: Regex,

    /// Post-match normalization, if any
    pub normalize: Option<NormalizeRule>,

    /// Post-match validation, if any
    pub validate: Option<ValidateRule>,

    /// Free-form description
    pub description: String,
}

/// One accepted match fragment produced by [`DetectorRegistry::apply`]
///
/// Fragments carry no document context; the match collector attaches the
/// document id and field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFragment {
    pub detector_name: String,
    pub raw_text: String,
    pub normalized_text: String,
}

/// Registry of compiled detectors, applied in definition order
#[derive(Debug)]
pub struct DetectorRegistry {
    detectors: Vec<DetectorSpec>,
}

impl DetectorRegistry {
    /// Build a registry from definitions, compiling every pattern
    ///
    /// Fails with a configuration error naming the offending detector if a
    /// pattern does not compile, a rule identifier is unknown, or two
    /// definitions share a name.
    pub fn load(definitions: Vec<DetectorDefinition>) -> Result<Self> {
        let mut detectors = Vec::with_capacity(definitions.len());
        let mut seen_names: HashSet<String> = HashSet::new();

        for def in definitions {
            if !seen_names.insert(def.name.clone()) {
                return Err(PiiScanError::Configuration(format!(
                    "Duplicate detector name '{}'",
                    def.name
                )));
            }

            let pattern = Regex::new(&def.pattern).map_err(|e| {
                PiiScanError::Configuration(format!(
                    "Invalid pattern in detector '{}': {e}",
                    def.name
                ))
            })?;

            let normalize = def
                .normalize
                .as_deref()
                .map(NormalizeRule::parse)
                .transpose()
                .map_err(|e| {
                    PiiScanError::Configuration(format!("Detector '{}': {e}", def.name))
                })?;

            let validate = def
                .validate
                .as_deref()
                .map(ValidateRule::parse)
                .transpose()
                .map_err(|e| {
                    PiiScanError::Configuration(format!("Detector '{}': {e}", def.name))
                })?;

            detectors.push(DetectorSpec {
                name: def.name,
                pattern,
                normalize,
                validate,
                description: def.description,
            });
        }

        Ok(Self { detectors })
    }

    /// Build a registry from TOML content (`[[detectors]]` array of tables)
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: DetectorLibrary = toml::from_str(content)?;
        Self::load(library.detectors)
    }

    /// Build a registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PiiScanError::Configuration(format!(
                "Failed to read detector file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse the raw definitions from TOML content without compiling
    pub fn definitions_from_toml(content: &str) -> Result<Vec<DetectorDefinition>> {
        let library: DetectorLibrary = toml::from_str(content)?;
        Ok(library.detectors)
    }

    /// The embedded default detector definitions
    pub fn builtin_definitions() -> Result<Vec<DetectorDefinition>> {
        Self::definitions_from_toml(include_str!("../../patterns/detectors.toml"))
    }

    /// Build a registry from the embedded default definitions
    pub fn builtin() -> Result<Self> {
        Self::load(Self::builtin_definitions()?)
    }

    /// All compiled detectors, in definition order
    pub fn detectors(&self) -> &[DetectorSpec] {
        &self.detectors
    }

    /// Look up a detector by name
    pub fn get(&self, name: &str) -> Option<&DetectorSpec> {
        self.detectors.iter().find(|d| d.name == name)
    }

    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector against a text value
    ///
    /// The value is separator-normalized once, then each pattern is applied
    /// in turn. A candidate whose normalize rule rejects it, or whose
    /// validate rule fails, is dropped silently. Applying the registry to
    /// the same text twice yields the same fragments.
    pub fn apply(&self, text: &str) -> Vec<MatchFragment> {
        if text.is_empty() {
            return Vec::new();
        }

        let text = normalize_separators(text);
        let mut fragments = Vec::new();

        for detector in &self.detectors {
            for m in detector.pattern.find_iter(&text) {
                let raw = m.as_str();

                let normalized = match detector.normalize {
                    Some(rule) => match rule.apply(raw) {
                        Some(v) => v,
                        None => continue,
                    },
                    None => raw.to_string(),
                };

                if let Some(rule) = detector.validate {
                    if !rule.apply(&normalized) {
                        tracing::trace!(
                            detector = %detector.name,
                            "Dropping candidate rejected by validator"
                        );
                        continue;
                    }
                }

                fragments.push(MatchFragment {
                    detector_name: detector.name.clone(),
                    raw_text: raw.to_string(),
                    normalized_text: normalized,
                });
            }
        }

        fragments
    }
}
