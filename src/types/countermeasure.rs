//! Countermeasure library entries and proposed actions

use serde::{Deserialize, Serialize};

use super::{EffortTier, Priority, Waste};
use crate::config::defaults::{DEFAULT_IMPACT_HIGH_PCT, DEFAULT_IMPACT_LOW_PCT, DEFAULT_IMPACT_MIDPOINT};

/// Expected improvement range of a countermeasure, in percent.
///
/// Deserialized from a two-element array (`impact_pct = [10, 25]`); anything
/// else is rejected while the template bundle is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct ImpactRange {
    pub low: f64,
    pub high: f64,
}

impl ImpactRange {
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        if !low.is_finite() || !high.is_finite() {
            return Err(format!("impact range [{low}, {high}] must be finite"));
        }
        if low < 0.0 || high < 0.0 {
            return Err(format!("impact range [{low}, {high}] cannot be negative"));
        }
        if low > high {
            return Err(format!("impact range [{low}, {high}] has low > high"));
        }
        Ok(Self { low, high })
    }

    /// Mean of the range as a fraction (15% → 0.15), floored at 0.
    pub fn midpoint(&self) -> f64 {
        let sum = self.low + self.high;
        if !sum.is_finite() {
            return DEFAULT_IMPACT_MIDPOINT;
        }
        (sum / 2.0).max(0.0) / 100.0
    }
}

impl Default for ImpactRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_IMPACT_LOW_PCT,
            high: DEFAULT_IMPACT_HIGH_PCT,
        }
    }
}

impl TryFrom<Vec<f64>> for ImpactRange {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [low, high] => Self::new(*low, *high),
            other => Err(format!(
                "impact_pct must have exactly 2 values, got {}",
                other.len()
            )),
        }
    }
}

impl From<ImpactRange> for [f64; 2] {
    fn from(range: ImpactRange) -> Self {
        [range.low, range.high]
    }
}

impl std::fmt::Display for ImpactRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}-{:.0}%", self.low, self.high)
    }
}

/// A candidate action from the countermeasure library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Countermeasure {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub effort: EffortTier,
    #[serde(default)]
    pub impact_pct: ImpactRange,
    /// KPI used to track the action
    #[serde(default)]
    pub kpi: String,
    /// Preconditions before the action can start
    #[serde(default)]
    pub pre: String,
}

/// A ranked entry of the action plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub stage: String,
    pub waste: Waste,
    pub action: String,
    pub desc: String,
    pub effort: EffortTier,
    pub impact_pct_range: ImpactRange,
    pub est_annual_benefit: f64,
    /// Benefit rendered for display, e.g. "12,500 SAR"
    pub est_annual_benefit_fmt: String,
    pub priority: Priority,
    pub kpi: String,
    pub preconditions: String,
    /// 1-based position in the final plan (0 until ranks are assigned)
    pub rank: usize,
}

/// Format a monetary amount with thousands separators and no decimals,
/// followed by the currency code.
pub fn format_amount(value: f64, currency: &str) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return format!("{rounded} {currency}");
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if grouped == "0" {
        return format!("0 {currency}");
    }
    format!("{sign}{grouped} {currency}")
}
