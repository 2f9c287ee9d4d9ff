//! Detector registry and built-in normalization/validation rules
//!
//! A detector is a named regex pattern with an optional normalize rule and
//! an optional validate rule, both resolved from a fixed built-in set at
//! configuration load time. Detectors are heuristic pattern matchers, not
//! validators of ground truth.

pub mod registry;
pub mod rules;

pub use registry::{DetectorDefinition, DetectorRegistry, DetectorSpec, MatchFragment};
pub use rules::{NormalizeRule, ValidateRule};
