//! Assessment Pipeline
//!
//! ```text
//! AssessmentSession ──► Edge ──► PACE ──► Countermeasures ──► AssessmentReport
//! ```
//!
//! One pass, one direction. The session and the template bundle are only
//! borrowed; each run recomputes everything from scratch.

mod session;

pub use session::{AssessmentSession, SessionError};

use tracing::info;

use crate::config::PaceConfig;
use crate::pace::{compute_pace, propose_countermeasures, PaceInputs, SelectionOptions};
use crate::report::AssessmentReport;

/// Run Edge → PACE → Countermeasures for one session.
pub fn run_assessment(config: &PaceConfig, session: &AssessmentSession) -> AssessmentReport {
    let profile = session.profile.as_deref();

    let inputs = PaceInputs {
        stages: &session.stages,
        benefits: &session.benefits,
        objective_weights: Some(&session.objective_weights),
        profile,
        measured: Some(&session.measured),
        history: Some(session.history.as_slice()),
    };
    let pace = compute_pace(config, &inputs);

    let options = SelectionOptions {
        max_per_stage: session.max_per_stage,
        profile,
        include_generic: session.include_generic,
    };
    let actions = propose_countermeasures(
        config,
        &session.stages,
        &session.benefits,
        &options,
        Some(&pace),
    );

    info!(
        stages = session.stages.len(),
        wastes = pace.top_wastes.len(),
        top = ?pace.top_wastes.first().map(|r| r.waste),
        actions = actions.len(),
        badge = pace.badge.enabled,
        "Assessment complete"
    );

    AssessmentReport::new(config, profile, &session.benefits, pace, actions)
}
