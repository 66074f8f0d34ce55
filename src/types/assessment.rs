//! Assessor inputs: stage severity picks, benefit estimates, objective weights

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::Waste;
use crate::config::defaults::{
    MAX_CONFIDENCE, MAX_SEVERITY, MIN_CONFIDENCE, TOP_PICKS_PER_STAGE,
};

/// Objective id → stakeholder weight (0.0–2.0, raw, not normalized)
pub type ObjectiveWeights = BTreeMap<String, f64>;

/// Metric key → value measured on site
pub type MeasuredMetrics = BTreeMap<String, f64>;

/// Errors raised when an assessment violates its value ranges
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    #[error("Severity for {waste} in stage '{stage}' must be within 0-5, got {value}")]
    SeverityOutOfRange { stage: String, waste: Waste, value: f64 },

    #[error("Confidence for stage '{stage}' must be within 0.1-1.0, got {value}")]
    ConfidenceOutOfRange { stage: String, value: f64 },

    #[error("Stage '{stage}' lists {count} wastes, at most 3 are allowed")]
    TooManyPicks { stage: String, count: usize },

    #[error("Stage '{stage}' lists {waste} more than once")]
    DuplicateWaste { stage: String, waste: Waste },

    #[error("Stage name must not be empty")]
    EmptyStageName,
}

/// One (waste, severity) pair from a stage's top-3
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WastePick {
    pub waste: Waste,
    /// Severity score, 0 (absent) to 5 (critical)
    pub severity: f64,
}

impl WastePick {
    pub const fn new(waste: Waste, severity: f64) -> Self {
        Self { waste, severity }
    }
}

/// Severity assessment for one value-chain stage.
///
/// Immutable once built; the constructors enforce the severity and
/// confidence ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageAssessment {
    stage: String,
    top3: Vec<WastePick>,
    confidence: f64,
}

impl StageAssessment {
    /// Build an assessment from explicit top-3 picks.
    pub fn new(
        stage: impl Into<String>,
        picks: Vec<WastePick>,
        confidence: f64,
    ) -> Result<Self, AssessmentError> {
        let stage = stage.into();
        if stage.trim().is_empty() {
            return Err(AssessmentError::EmptyStageName);
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(AssessmentError::ConfidenceOutOfRange {
                stage,
                value: confidence,
            });
        }
        if picks.len() > TOP_PICKS_PER_STAGE {
            return Err(AssessmentError::TooManyPicks {
                stage,
                count: picks.len(),
            });
        }
        for (i, pick) in picks.iter().enumerate() {
            if !(0.0..=MAX_SEVERITY).contains(&pick.severity) {
                return Err(AssessmentError::SeverityOutOfRange {
                    stage,
                    waste: pick.waste,
                    value: pick.severity,
                });
            }
            if picks[..i].iter().any(|p| p.waste == pick.waste) {
                return Err(AssessmentError::DuplicateWaste {
                    stage,
                    waste: pick.waste,
                });
            }
        }

        Ok(Self {
            stage,
            top3: picks,
            confidence,
        })
    }

    /// Build an assessment from a full per-waste severity grid, keeping the
    /// three most severe wastes. Zero scores are not picked; equal scores
    /// keep canonical waste order.
    pub fn from_scores(
        stage: impl Into<String>,
        scores: &BTreeMap<Waste, f64>,
        confidence: f64,
    ) -> Result<Self, AssessmentError> {
        let stage = stage.into();
        if let Some((&waste, &value)) = scores
            .iter()
            .find(|(_, v)| !(0.0..=MAX_SEVERITY).contains(*v))
        {
            return Err(AssessmentError::SeverityOutOfRange { stage, waste, value });
        }

        let mut ranked: Vec<WastePick> = scores
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(&w, &v)| WastePick::new(w, v))
            .collect();
        ranked.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        ranked.truncate(TOP_PICKS_PER_STAGE);

        Self::new(stage, ranked, confidence)
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Picks in the order they were submitted.
    pub fn top3(&self) -> &[WastePick] {
        &self.top3
    }

    /// Picks sorted by severity, most severe first.
    pub fn picks_by_severity(&self) -> Vec<WastePick> {
        let mut picks = self.top3.clone();
        picks.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        picks
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Estimated annual monetary benefit per waste category (business case)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenefitEstimate(BTreeMap<Waste, f64>);

impl BenefitEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, waste: Waste, amount: f64) {
        self.0.insert(waste, amount);
    }

    /// Benefit for a waste; wastes without an estimate count as 0.
    pub fn get(&self, waste: Waste) -> f64 {
        self.0.get(&waste).copied().unwrap_or(0.0)
    }

    /// Total estimated annual benefit across all wastes.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Waste, f64)> + '_ {
        self.0.iter().map(|(&w, &v)| (w, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<Waste, f64>> for BenefitEstimate {
    fn from(map: BTreeMap<Waste, f64>) -> Self {
        Self(map)
    }
}

impl FromIterator<(Waste, f64)> for BenefitEstimate {
    fn from_iter<I: IntoIterator<Item = (Waste, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
