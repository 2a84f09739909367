//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables.

use crate::seed;
use crate::TriageResult;
use referral::Patient;
use std::path::PathBuf;

/// Where the patient registry is seeded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedSource {
    /// The registry compiled into the crate.
    Embedded,
    /// A YAML registry file replacing the built-in seed.
    File(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    seed: SeedSource,
}

impl CoreConfig {
    pub fn new(seed: SeedSource) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> &SeedSource {
        &self.seed
    }

    /// Load the configured registry.
    pub fn load_registry(&self) -> TriageResult<Vec<Patient>> {
        match &self.seed {
            SeedSource::Embedded => seed::embedded(),
            SeedSource::File(path) => seed::from_file(path),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(SeedSource::Embedded)
    }
}

/// Parse the seed source from an optional string value.
///
/// If `value` is `None` or empty/whitespace, the embedded registry is used.
pub fn seed_source_from_env_value(value: Option<String>) -> SeedSource {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| SeedSource::File(PathBuf::from(v)))
        .unwrap_or(SeedSource::Embedded)
}
