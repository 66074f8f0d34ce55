//! Shared data structures for the PACE assessment pipeline
//!
//! - Waste taxonomy, effort tiers, priority buckets
//! - Assessor inputs: StageAssessment, BenefitEstimate, objective weights,
//!   measured metrics
//! - PACE output: PaceResult, RankedWaste, Badge
//! - Countermeasure library entries and the ProposedAction plan rows

mod assessment;
mod countermeasure;
mod pace;
mod waste;

pub use assessment::*;
pub use countermeasure::*;
pub use pace::*;
pub use waste::*;
