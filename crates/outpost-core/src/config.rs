//! Typed configuration for the decision engine's controllers.
//!
//! Every threshold the population controller and defense dispatcher use
//! lives here, with defaults matching the values the system was tuned
//! with. The canonical file is `outpost-config.yaml` at the project root;
//! all fields are optional in the file and fall back to their defaults.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Thresholds governing production and defense decisions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlConfig {
    /// Minimum zone energy before any production is attempted, and the
    /// floor of the allocation budget.
    #[serde(default = "default_production_floor")]
    pub production_floor: u32,

    /// Percentage of available zone energy offered as the allocation
    /// budget.
    #[serde(default = "default_budget_pct")]
    pub budget_pct: u32,

    /// Stored energy a turret keeps in reserve before it will heal.
    #[serde(default = "default_heal_reserve")]
    pub heal_reserve: u32,

    /// Stored energy a turret keeps in reserve before it will repair.
    #[serde(default = "default_repair_reserve")]
    pub repair_reserve: u32,

    /// Barriers and bulwarks above this current health are excluded from
    /// turret repair, so reserves are not poured into near-invulnerable
    /// fortifications.
    #[serde(default = "default_fortification_repair_cutoff")]
    pub fortification_repair_cutoff: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            production_floor: default_production_floor(),
            budget_pct: default_budget_pct(),
            heal_reserve: default_heal_reserve(),
            repair_reserve: default_repair_reserve(),
            fortification_repair_cutoff: default_fortification_repair_cutoff(),
        }
    }
}

impl ControlConfig {
    /// Load configuration from a YAML file at the given path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents)?)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }
}

const fn default_production_floor() -> u32 {
    300
}

const fn default_budget_pct() -> u32 {
    80
}

const fn default_heal_reserve() -> u32 {
    1_050
}

const fn default_repair_reserve() -> u32 {
    1_550
}

const fn default_fortification_repair_cutoff() -> u32 {
    100_000
}
