//! PACE Prioritization Engine
//!
//! ## Stages
//!
//! ```text
//! measured metrics + profile benchmarks ──► edge      (per-waste factor)
//! stage severity + benefit + objectives ──► combiner  (ranked wastes, badge)
//! stage picks + library + PACE ranking  ──► countermeasures (ranked actions)
//! ```
//!
//! Every function here is pure: inputs are borrowed, nothing is cached, and
//! missing optional data falls back to neutral values instead of failing.

pub mod combiner;
pub mod countermeasures;
pub mod edge;

pub use combiner::{compute_pace, PaceInputs};
pub use countermeasures::{build_library, propose_countermeasures, SelectionOptions};
pub use edge::compute_edge;
