//! Kafaa PACE: Operational Excellence Prioritization
//!
//! Scores the eight operational wastes across a client's value chain and
//! turns the ranking into a capped, prioritized countermeasure plan.
//!
//! ## Architecture
//!
//! - **Config**: template bundle (objectives, benchmarks, countermeasure libraries)
//! - **PACE Engine**: Present × Advantage × Critical × Edge scoring and action selection
//! - **Pipeline**: one assessment session in, one report out
//! - **Report**: JSON or plain-text action plan export

pub mod config;
pub mod types;
pub mod pace;
pub mod pipeline;
pub mod report;

// Re-export template configuration
pub use config::{ConfigError, PaceConfig};

// Re-export commonly used types
pub use types::{
    AssessmentError, Badge, BenefitEstimate, Countermeasure, EffortTier, ImpactRange,
    MeasuredMetrics, ObjectiveWeights, PaceResult, Priority, ProposedAction, RankedWaste,
    StageAssessment, Waste, WastePick,
};

// Re-export the engine entry points
pub use pace::{compute_edge, compute_pace, propose_countermeasures, PaceInputs, SelectionOptions};

// Re-export pipeline and report
pub use pipeline::{run_assessment, AssessmentSession, SessionError};
pub use report::{AssessmentReport, ExportError, ReportFormat};
