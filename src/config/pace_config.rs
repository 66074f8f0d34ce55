//! PACE template bundle - objectives, benchmarks and countermeasure libraries
//!
//! Every table the engine reads lives here as a typed struct. The bundle is
//! parsed once, validated, and then passed by reference; nothing in the
//! engine mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_CURRENCY, DEFAULT_MIN_TRACKED,
    DEFAULT_OBJECTIVE_WEIGHT, DEFAULT_STAGES,
};
use crate::types::{Countermeasure, ObjectiveWeights, Waste};

/// Template bundle shipped with the crate, used when no file is found.
pub const EMBEDDED_TEMPLATES: &str = include_str!("../../templates/pace_templates.toml");

/// Waste → candidate countermeasures
pub type CountermeasureLibrary = BTreeMap<Waste, Vec<Countermeasure>>;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root of the template bundle.
///
/// Load with `PaceConfig::load()` which searches:
/// 1. `$PACE_CONFIG` env var
/// 2. `./pace_templates.toml`
/// 3. The embedded bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaceConfig {
    #[serde(default)]
    pub assumptions: Assumptions,

    /// Ordered value-chain stages an assessment may refer to
    #[serde(default)]
    pub value_chain: ValueChainConfig,

    /// Objectives, objective → waste matrix, edge metrics, badge
    #[serde(default)]
    pub prioritization: PrioritizationConfig,

    /// Industry profile key → benchmarks
    #[serde(default)]
    pub profiles: BTreeMap<String, IndustryProfile>,

    /// Generic (profile-independent) countermeasures
    #[serde(default)]
    pub countermeasures: CountermeasureLibrary,

    /// Profile key → profile-specific countermeasures
    #[serde(default)]
    pub countermeasures_profiles: BTreeMap<String, CountermeasureLibrary>,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            assumptions: Assumptions::default(),
            value_chain: ValueChainConfig::default(),
            prioritization: PrioritizationConfig::default(),
            profiles: BTreeMap::new(),
            countermeasures: BTreeMap::new(),
            countermeasures_profiles: BTreeMap::new(),
        }
    }
}

impl PaceConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PACE_CONFIG` environment variable
    /// 2. `./pace_templates.toml` in the current working directory
    /// 3. The embedded template bundle
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), profiles = config.profiles.len(), "Loaded templates from PACE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load templates from PACE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PACE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./pace_templates.toml
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(profiles = config.profiles.len(), "Loaded templates from ./pace_templates.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./pace_templates.toml, using embedded templates");
                }
            }
        }

        // 3. Embedded bundle
        match Self::builtin() {
            Ok(config) => {
                info!("No pace_templates.toml found, using embedded templates");
                config
            }
            Err(e) => {
                warn!(error = %e, "Embedded templates failed to load, using empty defaults");
                Self::default()
            }
        }
    }

    /// Parse the template bundle compiled into the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_TEMPLATES, "<embedded>")
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    /// Parse and validate a bundle from TOML text.
    ///
    /// Two passes: the raw key tree is checked against the known schema
    /// first (unknown keys are rejected with a "did you mean" hint), then
    /// the typed structs are deserialized and validated.
    pub fn from_toml_str(raw: &str, source: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw
            .parse()
            .map_err(|e| ConfigError::Parse(source.to_string(), e))?;

        let unknown = super::validation::validate_unknown_keys(&toml::Value::Table(table));
        if !unknown.is_empty() {
            return Err(ConfigError::Validation(
                unknown.iter().map(ToString::to_string).collect(),
            ));
        }

        let config: Self =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(source.to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the bundle to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save the bundle to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Template bundle saved");
        Ok(())
    }

    /// Validate cross-references and value ranges.
    ///
    /// Errors make the bundle unusable; warnings are logged and ignored.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_semantics(self);
        for w in &warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn profile(&self, key: &str) -> Option<&IndustryProfile> {
        self.profiles.get(key)
    }

    /// Benchmark table of a profile; `None` when no profile is selected or
    /// the key is unknown.
    pub fn benchmarks_for(&self, profile: Option<&str>) -> Option<&BTreeMap<String, f64>> {
        profile
            .and_then(|key| self.profiles.get(key))
            .map(|p| &p.benchmarks)
    }

    /// Objective weights as declared in the bundle (each objective's default).
    pub fn default_objective_weights(&self) -> ObjectiveWeights {
        self.prioritization
            .critical_objectives
            .iter()
            .map(|o| (o.id.clone(), o.weight))
            .collect()
    }

    pub fn has_objective(&self, id: &str) -> bool {
        self.prioritization
            .critical_objectives
            .iter()
            .any(|o| o.id == id)
    }

    pub fn has_stage(&self, name: &str) -> bool {
        self.value_chain.stages.iter().any(|s| s == name)
    }

    pub fn currency(&self) -> &str {
        &self.assumptions.currency
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(String, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(source, e) => write!(f, "Config parse error ({source}): {e}"),
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

// ============================================================================
// Assumptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assumptions {
    /// Currency code appended to formatted amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ============================================================================
// Value Chain
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueChainConfig {
    #[serde(default = "default_stages")]
    pub stages: Vec<String>,
}

impl Default for ValueChainConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
        }
    }
}

fn default_stages() -> Vec<String> {
    DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// Prioritization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrioritizationConfig {
    /// Stakeholder objectives the "Critical" factor is built from
    #[serde(default)]
    pub critical_objectives: Vec<CriticalObjective>,

    /// Objective id → waste → coefficient
    #[serde(default)]
    pub objective_to_waste: BTreeMap<String, BTreeMap<Waste, f64>>,

    /// Waste → metric compared against the profile benchmark
    #[serde(default)]
    pub edge_metrics: BTreeMap<Waste, EdgeMetric>,

    #[serde(default)]
    pub kpi_badge: KpiBadgeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriticalObjective {
    pub id: String,
    pub name: String,
    /// Default stakeholder weight (0.0–2.0)
    #[serde(default = "default_objective_weight")]
    pub weight: f64,
}

fn default_objective_weight() -> f64 {
    DEFAULT_OBJECTIVE_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeMetric {
    /// Benchmark / measurement lookup key
    pub key: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_true")]
    pub higher_is_better: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KpiBadgeConfig {
    /// Above-median objectives needed to enable the badge
    #[serde(default = "default_min_tracked")]
    pub min_tracked: usize,
}

impl Default for KpiBadgeConfig {
    fn default() -> Self {
        Self {
            min_tracked: default_min_tracked(),
        }
    }
}

fn default_min_tracked() -> usize {
    DEFAULT_MIN_TRACKED
}

// ============================================================================
// Industry Profiles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndustryProfile {
    pub label: String,
    /// Metric key → industry target value
    #[serde(default)]
    pub benchmarks: BTreeMap<String, f64>,
}
