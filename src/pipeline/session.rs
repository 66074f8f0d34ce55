//! Assessment session: everything one client assessment supplies
//!
//! A session is built once (from TOML or in code), checked against the
//! template bundle, and then only read.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::defaults::{
    DEFAULT_CONFIDENCE, DEFAULT_MAX_PER_STAGE, MAX_OBJECTIVE_WEIGHT, MAX_PER_STAGE_LIMIT,
};
use crate::config::{validation, PaceConfig};
use crate::types::{
    AssessmentError, BenefitEstimate, MeasuredMetrics, ObjectiveWeights, PaceResult,
    StageAssessment, Waste, WastePick,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session parse error ({origin}): {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error("Session validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

/// Inputs of one assessment run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSession {
    /// Industry profile key (benchmarks and profile countermeasures)
    pub profile: Option<String>,
    pub stages: Vec<StageAssessment>,
    pub benefits: BenefitEstimate,
    /// Raw stakeholder weights; empty means the bundle defaults
    pub objective_weights: ObjectiveWeights,
    pub measured: MeasuredMetrics,
    pub include_generic: bool,
    pub max_per_stage: usize,
    /// Earlier PACE results of this client
    pub history: Vec<PaceResult>,
}

impl AssessmentSession {
    pub fn new(stages: Vec<StageAssessment>, benefits: BenefitEstimate) -> Self {
        Self {
            profile: None,
            stages,
            benefits,
            objective_weights: ObjectiveWeights::new(),
            measured: MeasuredMetrics::new(),
            include_generic: true,
            max_per_stage: DEFAULT_MAX_PER_STAGE,
            history: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_objective_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.objective_weights = weights;
        self
    }

    pub fn with_measured(mut self, measured: MeasuredMetrics) -> Self {
        self.measured = measured;
        self
    }

    pub fn with_history(mut self, history: Vec<PaceResult>) -> Self {
        self.history = history;
        self
    }

    /// Load a session file and check it against the bundle.
    pub fn load_from_file(path: &Path, config: &PaceConfig) -> Result<Self, SessionError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session = Self::parse(&contents, &path.display().to_string(), config)?;
        info!(
            path = %path.display(),
            stages = session.stages.len(),
            profile = session.profile.as_deref().unwrap_or("none"),
            "Loaded assessment session"
        );
        Ok(session)
    }

    /// Parse a session from TOML text and check it against the bundle.
    pub fn from_toml_str(raw: &str, config: &PaceConfig) -> Result<Self, SessionError> {
        Self::parse(raw, "<string>", config)
    }

    fn parse(raw: &str, origin: &str, config: &PaceConfig) -> Result<Self, SessionError> {
        let file: SessionFile = toml::from_str(raw).map_err(|source| SessionError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        file.into_session(config)
    }

    /// Cross-check a session built in code against the bundle.
    ///
    /// Sessions loaded from a file have already passed these checks.
    pub fn validate(&self, config: &PaceConfig) -> Result<(), SessionError> {
        let mut errors = Vec::new();
        check_profile(self.profile.as_deref(), config, &mut errors);
        check_objectives(&self.objective_weights, config, &mut errors);
        check_amounts(&self.benefits, &self.measured, &mut errors);
        check_max_per_stage(self.max_per_stage, &mut errors);
        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            check_stage_name(stage.stage(), config, &mut seen, &mut errors);
        }
        into_result(errors)
    }
}

// ============================================================================
// File Format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    objectives: ObjectiveWeights,
    #[serde(default)]
    benefits: BTreeMap<Waste, f64>,
    #[serde(default)]
    measured: MeasuredMetrics,
    #[serde(default = "default_true")]
    include_generic: bool,
    #[serde(default = "default_max_per_stage")]
    max_per_stage: usize,
    #[serde(default)]
    stages: Vec<StageEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StageEntry {
    name: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    top3: Option<Vec<WastePick>>,
    /// Full per-waste severity grid; the three highest are kept
    #[serde(default)]
    scores: Option<BTreeMap<Waste, f64>>,
}

fn default_true() -> bool {
    true
}

fn default_max_per_stage() -> usize {
    DEFAULT_MAX_PER_STAGE
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl SessionFile {
    fn into_session(self, config: &PaceConfig) -> Result<AssessmentSession, SessionError> {
        let benefits = BenefitEstimate::from(self.benefits);

        let mut errors = Vec::new();
        check_profile(self.profile.as_deref(), config, &mut errors);
        check_objectives(&self.objectives, config, &mut errors);
        check_amounts(&benefits, &self.measured, &mut errors);
        check_max_per_stage(self.max_per_stage, &mut errors);

        let mut seen = BTreeSet::new();
        for entry in &self.stages {
            check_stage_name(&entry.name, config, &mut seen, &mut errors);
            match (&entry.top3, &entry.scores) {
                (Some(_), Some(_)) => errors.push(format!(
                    "stages.{}: give either top3 or scores, not both",
                    entry.name
                )),
                (None, None) => errors.push(format!(
                    "stages.{}: one of top3 or scores is required",
                    entry.name
                )),
                _ => {}
            }
        }
        into_result(errors)?;

        let stages = self
            .stages
            .into_iter()
            .map(StageEntry::into_assessment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentSession {
            profile: self.profile,
            stages,
            benefits,
            objective_weights: self.objectives,
            measured: self.measured,
            include_generic: self.include_generic,
            max_per_stage: self.max_per_stage,
            history: Vec::new(),
        })
    }
}

impl StageEntry {
    fn into_assessment(self) -> Result<StageAssessment, AssessmentError> {
        match (self.top3, self.scores) {
            (_, Some(scores)) => StageAssessment::from_scores(self.name, &scores, self.confidence),
            (top3, None) => {
                StageAssessment::new(self.name, top3.unwrap_or_default(), self.confidence)
            }
        }
    }
}

// ============================================================================
// Checks
// ============================================================================

fn check_profile(profile: Option<&str>, config: &PaceConfig, errors: &mut Vec<String>) {
    let Some(key) = profile else {
        return;
    };
    if config.profile(key).is_none() {
        errors.push(with_hint(
            format!("profile '{key}' is not defined in the template bundle"),
            validation::did_you_mean(key, config.profiles.keys().map(String::as_str)),
        ));
    }
}

fn check_objectives(weights: &ObjectiveWeights, config: &PaceConfig, errors: &mut Vec<String>) {
    let declared = &config.prioritization.critical_objectives;
    for (id, &weight) in weights {
        if !config.has_objective(id) {
            errors.push(with_hint(
                format!("objectives.{id} is not a declared objective"),
                validation::did_you_mean(id, declared.iter().map(|o| o.id.as_str())),
            ));
        }
        if !(0.0..=MAX_OBJECTIVE_WEIGHT).contains(&weight) {
            errors.push(format!("objectives.{id} = {weight} is outside 0-2"));
        }
    }
}

fn check_amounts(benefits: &BenefitEstimate, measured: &MeasuredMetrics, errors: &mut Vec<String>) {
    for (waste, amount) in benefits.iter() {
        if !amount.is_finite() || amount < 0.0 {
            errors.push(format!("benefits.{waste} = {amount} must be a non-negative amount"));
        }
    }
    for (key, value) in measured {
        if !value.is_finite() {
            errors.push(format!("measured.{key} must be finite"));
        }
    }
}

fn check_max_per_stage(max_per_stage: usize, errors: &mut Vec<String>) {
    if !(1..=MAX_PER_STAGE_LIMIT).contains(&max_per_stage) {
        errors.push(format!(
            "max_per_stage = {max_per_stage} is outside 1-{MAX_PER_STAGE_LIMIT}"
        ));
    }
}

fn check_stage_name<'a>(
    name: &'a str,
    config: &PaceConfig,
    seen: &mut BTreeSet<&'a str>,
    errors: &mut Vec<String>,
) {
    if !config.has_stage(name) {
        errors.push(with_hint(
            format!("stage '{name}' is not in value_chain.stages"),
            validation::did_you_mean(name, config.value_chain.stages.iter().map(String::as_str)),
        ));
    }
    if !seen.insert(name) {
        errors.push(format!("stage '{name}' is assessed more than once"));
    }
}

fn with_hint(message: String, suggestion: Option<String>) -> String {
    match suggestion {
        Some(s) => format!("{message}, did you mean '{s}'?"),
        None => message,
    }
}

fn into_result(errors: Vec<String>) -> Result<(), SessionError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SessionError::Validation(errors))
    }
}
