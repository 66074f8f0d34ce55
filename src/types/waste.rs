//! Waste taxonomy, effort tiers and priority buckets

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operational waste category (the classic lean wastes plus safety).
///
/// Declaration order is the canonical order: it drives `Ord`, map iteration
/// and tie-breaking wherever two wastes score the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Waste {
    Defects,
    Waiting,
    Inventory,
    Transportation,
    Motion,
    Overprocessing,
    Overproduction,
    Safety,
}

impl Waste {
    /// All categories in canonical order.
    pub const ALL: [Waste; 8] = [
        Waste::Defects,
        Waste::Waiting,
        Waste::Inventory,
        Waste::Transportation,
        Waste::Motion,
        Waste::Overprocessing,
        Waste::Overproduction,
        Waste::Safety,
    ];

    /// Lowercase identifier used in templates and session files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Waste::Defects => "defects",
            Waste::Waiting => "waiting",
            Waste::Inventory => "inventory",
            Waste::Transportation => "transportation",
            Waste::Motion => "motion",
            Waste::Overprocessing => "overprocessing",
            Waste::Overproduction => "overproduction",
            Waste::Safety => "safety",
        }
    }

    /// Title-cased label for reports.
    pub const fn label(self) -> &'static str {
        match self {
            Waste::Defects => "Defects",
            Waste::Waiting => "Waiting",
            Waste::Inventory => "Inventory",
            Waste::Transportation => "Transportation",
            Waste::Motion => "Motion",
            Waste::Overprocessing => "Overprocessing",
            Waste::Overproduction => "Overproduction",
            Waste::Safety => "Safety",
        }
    }
}

impl std::fmt::Display for Waste {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a waste category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown waste category: {0}")]
pub struct UnknownWaste(pub String);

impl FromStr for Waste {
    type Err = UnknownWaste;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Waste::ALL
            .iter()
            .copied()
            .find(|w| w.as_str() == needle)
            .ok_or_else(|| UnknownWaste(s.to_string()))
    }
}

impl TryFrom<String> for Waste {
    type Error = UnknownWaste;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Qualitative cost-to-implement tier for a countermeasure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortTier {
    Low,
    #[default]
    Medium,
    High,
}

impl EffortTier {
    /// Sort key: lower effort is preferred.
    pub const fn rank(self) -> u8 {
        match self {
            EffortTier::Low => 0,
            EffortTier::Medium => 1,
            EffortTier::High => 2,
        }
    }
}

impl std::fmt::Display for EffortTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffortTier::Low => write!(f, "low"),
            EffortTier::Medium => write!(f, "medium"),
            EffortTier::High => write!(f, "high"),
        }
    }
}

/// Action-plan priority bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Now,
    Next,
    Later,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Now => write!(f, "Now"),
            Priority::Next => write!(f, "Next"),
            Priority::Later => write!(f, "Later"),
        }
    }
}
