//! Countermeasure selector
//!
//! Turns each stage's most severe wastes into candidate actions from the
//! library, estimates their annual benefit, caps the list per stage and
//! finally re-weights it against the PACE ranking.

use std::cmp::Ordering;
use tracing::debug;

use crate::config::defaults::{
    CANDIDATES_PER_WASTE, MAX_SEVERITY, PACE_BOOST_CUTOFF_RANK, PACE_BOOST_STEP, PACE_NEXT_RANK,
    PACE_NOW_RANK,
};
use crate::config::{CountermeasureLibrary, PaceConfig};
use crate::types::{
    format_amount, BenefitEstimate, Countermeasure, EffortTier, PaceResult, Priority,
    ProposedAction, StageAssessment,
};

/// Knobs of one selection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOptions<'a> {
    /// Most actions kept for any one stage
    pub max_per_stage: usize,
    /// Industry profile whose specific countermeasures are added
    pub profile: Option<&'a str>,
    /// Include the profile-independent library
    pub include_generic: bool,
}

impl Default for SelectionOptions<'_> {
    fn default() -> Self {
        Self {
            max_per_stage: crate::config::defaults::DEFAULT_MAX_PER_STAGE,
            profile: None,
            include_generic: true,
        }
    }
}

/// Merge the generic library (when requested) with a profile's entries.
///
/// Generic candidates come first for each waste, profile candidates after.
pub fn build_library(
    config: &PaceConfig,
    profile: Option<&str>,
    include_generic: bool,
) -> CountermeasureLibrary {
    let mut library = CountermeasureLibrary::new();
    if include_generic {
        for (&waste, entries) in &config.countermeasures {
            library.entry(waste).or_default().extend(entries.iter().cloned());
        }
    }
    if let Some(specific) = profile.and_then(|p| config.countermeasures_profiles.get(p)) {
        for (&waste, entries) in specific {
            library.entry(waste).or_default().extend(entries.iter().cloned());
        }
    }
    library
}

/// Build the library from the bundle and rank actions for every stage.
pub fn propose_countermeasures(
    config: &PaceConfig,
    stages: &[StageAssessment],
    benefits: &BenefitEstimate,
    options: &SelectionOptions<'_>,
    pace: Option<&PaceResult>,
) -> Vec<ProposedAction> {
    let library = build_library(config, options.profile, options.include_generic);
    select_actions(
        stages,
        &library,
        benefits,
        options.max_per_stage,
        config.currency(),
        pace,
    )
}

/// Rank actions against an already merged library.
pub fn select_actions(
    stages: &[StageAssessment],
    library: &CountermeasureLibrary,
    benefits: &BenefitEstimate,
    max_per_stage: usize,
    currency: &str,
    pace: Option<&PaceResult>,
) -> Vec<ProposedAction> {
    let mut actions: Vec<ProposedAction> = Vec::new();

    for stage in stages {
        for pick in stage.picks_by_severity() {
            let Some(candidates) = library.get(&pick.waste).filter(|c| !c.is_empty()) else {
                continue;
            };
            for cm in shortlist(candidates) {
                let benefit = benefits.get(pick.waste)
                    * cm.impact_pct.midpoint()
                    * (pick.severity / MAX_SEVERITY)
                    * stage.confidence();
                actions.push(ProposedAction {
                    stage: stage.stage().to_string(),
                    waste: pick.waste,
                    action: cm.name.clone(),
                    desc: cm.desc.clone(),
                    effort: cm.effort,
                    impact_pct_range: cm.impact_pct,
                    est_annual_benefit: benefit,
                    est_annual_benefit_fmt: format_amount(benefit, currency),
                    priority: base_priority(cm.effort, benefit),
                    kpi: cm.kpi.clone(),
                    preconditions: cm.pre.clone(),
                    rank: 0,
                });
            }
        }
        cap_stage(&mut actions, stage.stage(), max_per_stage);
    }

    actions.sort_by(by_benefit_desc);

    if let Some(pace) = pace.filter(|p| !p.is_empty()) {
        apply_pace_weighting(&mut actions, pace, currency);
    }

    for (i, action) in actions.iter_mut().enumerate() {
        action.rank = i + 1;
    }

    debug!(
        stages = stages.len(),
        actions = actions.len(),
        max_per_stage,
        "Countermeasures selected"
    );
    actions
}

/// Lowest effort first, then widest expected impact; keep the first two.
fn shortlist(candidates: &[Countermeasure]) -> Vec<&Countermeasure> {
    let mut sorted: Vec<&Countermeasure> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        a.effort
            .rank()
            .cmp(&b.effort.rank())
            .then_with(|| b.impact_pct.midpoint().total_cmp(&a.impact_pct.midpoint()))
    });
    sorted.truncate(CANDIDATES_PER_WASTE);
    sorted
}

/// Priority before PACE re-weighting.
pub fn base_priority(effort: EffortTier, benefit: f64) -> Priority {
    match effort {
        EffortTier::Low if benefit > 0.0 => Priority::Now,
        EffortTier::Medium => Priority::Next,
        _ => Priority::Later,
    }
}

/// Keep only the `max_per_stage` most valuable actions of one stage.
///
/// The stage's survivors move to the end of the list; other stages keep
/// their relative order.
fn cap_stage(actions: &mut Vec<ProposedAction>, stage: &str, max_per_stage: usize) {
    let (mut own, others): (Vec<_>, Vec<_>) =
        actions.drain(..).partition(|a| a.stage == stage);
    own.sort_by(by_benefit_desc);
    own.truncate(max_per_stage);
    actions.extend(others);
    actions.extend(own);
}

fn by_benefit_desc(a: &ProposedAction, b: &ProposedAction) -> Ordering {
    b.est_annual_benefit
        .partial_cmp(&a.est_annual_benefit)
        .unwrap_or(Ordering::Equal)
}

/// Lift the priority and benefit of actions on highly ranked wastes.
///
/// The list is not re-sorted afterwards, so final ranks follow the
/// pre-boost order.
pub fn apply_pace_weighting(actions: &mut [ProposedAction], pace: &PaceResult, currency: &str) {
    let ranks = pace.rank_map();
    for action in actions.iter_mut() {
        let Some(&rank) = ranks.get(&action.waste) else {
            continue;
        };
        if rank <= PACE_NOW_RANK {
            action.priority = Priority::Now;
        } else if rank <= PACE_NEXT_RANK && action.priority != Priority::Now {
            action.priority = Priority::Next;
        }
        action.est_annual_benefit *= pace_boost(rank);
        action.est_annual_benefit_fmt = format_amount(action.est_annual_benefit, currency);
    }
}

/// `1 + 0.15 · max(0, 6 - rank)`
pub fn pace_boost(rank: usize) -> f64 {
    1.0 + PACE_BOOST_STEP * PACE_BOOST_CUTOFF_RANK.saturating_sub(rank) as f64
}
