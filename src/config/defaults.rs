//! System-wide default constants.
//!
//! Centralises the fixed numbers of the PACE formulas and the fallbacks used
//! when the template bundle or an assessment leaves something out.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Loading
// ============================================================================

/// Environment variable pointing at a template bundle TOML file.
pub const CONFIG_ENV_VAR: &str = "PACE_CONFIG";

/// Template bundle looked up in the current working directory.
pub const CONFIG_FILE_NAME: &str = "pace_templates.toml";

/// Display currency when the bundle does not set one.
pub const DEFAULT_CURRENCY: &str = "SAR";

/// Standard value-chain stages, in flow order.
pub const DEFAULT_STAGES: [&str; 9] = [
    "Order Intake",
    "Inbound Logistics",
    "Receiving & QA",
    "Raw Material Storage",
    "Kitting/Pre-production",
    "Production",
    "Finishing/Pack",
    "Outbound Logistics",
    "Shipping/Customer",
];

// ============================================================================
// Assessment Ranges
// ============================================================================

/// Highest severity an assessor can give a waste.
pub const MAX_SEVERITY: f64 = 5.0;

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Confidence assumed for a session stage that does not state one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Wastes kept per stage.
pub const TOP_PICKS_PER_STAGE: usize = 3;

/// Upper bound of a raw objective weight.
pub const MAX_OBJECTIVE_WEIGHT: f64 = 2.0;

/// Weight of an objective that does not declare one.
pub const DEFAULT_OBJECTIVE_WEIGHT: f64 = 1.0;

// ============================================================================
// Edge Percentiles
// ============================================================================

pub const EDGE_FACTOR_MIN: f64 = 0.7;
pub const EDGE_FACTOR_MAX: f64 = 1.4;

/// Bound on ln(ratio) before it is added to 1.0.
pub const EDGE_LOG_CLAMP: f64 = 0.4;

/// Floor for denominators and logarithm arguments.
pub const RATIO_EPSILON: f64 = 1e-6;

// ============================================================================
// PACE Combiner
// ============================================================================

/// Added to the benefit before log10 so a zero benefit scores 1.0.
pub const BENEFIT_LOG_OFFSET: f64 = 10.0;

/// Minimum above-median objectives for the readiness badge.
pub const DEFAULT_MIN_TRACKED: usize = 4;

/// Number of ranked wastes shown as "top themes" in reports.
pub const TOP_THEMES: usize = 6;

// ============================================================================
// Countermeasure Selector
// ============================================================================

/// Impact range assumed when a library entry does not give one (percent).
pub const DEFAULT_IMPACT_LOW_PCT: f64 = 10.0;
pub const DEFAULT_IMPACT_HIGH_PCT: f64 = 20.0;

/// Impact midpoint used when a range cannot produce one.
pub const DEFAULT_IMPACT_MIDPOINT: f64 = 0.15;

/// Candidates taken per (stage, waste) after effort/impact sorting.
pub const CANDIDATES_PER_WASTE: usize = 2;

pub const DEFAULT_MAX_PER_STAGE: usize = 3;

/// Largest per-stage cap a session may request.
pub const MAX_PER_STAGE_LIMIT: usize = 5;

/// PACE ranks at or above this force priority "Now".
pub const PACE_NOW_RANK: usize = 2;

/// PACE ranks at or above this lift priority to at least "Next".
pub const PACE_NEXT_RANK: usize = 4;

/// Benefit boost per rank step: `1 + step * max(0, cutoff - rank)`.
pub const PACE_BOOST_STEP: f64 = 0.15;
pub const PACE_BOOST_CUTOFF_RANK: usize = 6;
