//! PACE combiner: Present × Advantage × Critical × Edge
//!
//! - Present: average stage severity of each waste (0–5, scaled to 0–1)
//! - Advantage: log10 of the estimated annual benefit
//! - Critical: objective-weighted waste weight
//! - Edge: benchmark-relative factor from `edge::compute_edge`

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::edge::compute_edge;
use crate::config::defaults::{BENEFIT_LOG_OFFSET, MAX_SEVERITY};
use crate::config::PaceConfig;
use crate::types::{
    Badge, BenefitEstimate, MeasuredMetrics, ObjectiveWeights, PaceResult, RankedWaste,
    StageAssessment, Waste,
};

/// Everything a PACE computation reads besides the template bundle.
#[derive(Debug, Clone, Copy)]
pub struct PaceInputs<'a> {
    pub stages: &'a [StageAssessment],
    pub benefits: &'a BenefitEstimate,
    /// Raw stakeholder weights; `None` or empty uses the bundle defaults
    pub objective_weights: Option<&'a ObjectiveWeights>,
    /// Industry profile whose benchmarks feed the Edge factor
    pub profile: Option<&'a str>,
    pub measured: Option<&'a MeasuredMetrics>,
    /// Earlier results of the same assessment. Accepted for callers that
    /// keep a trend, not used by the score.
    pub history: Option<&'a [PaceResult]>,
}

impl<'a> PaceInputs<'a> {
    pub fn new(stages: &'a [StageAssessment], benefits: &'a BenefitEstimate) -> Self {
        Self {
            stages,
            benefits,
            objective_weights: None,
            profile: None,
            measured: None,
            history: None,
        }
    }
}

/// Rank every waste category present in the inputs by its PACE score.
pub fn compute_pace(config: &PaceConfig, inputs: &PaceInputs<'_>) -> PaceResult {
    let prio = &config.prioritization;

    // Critical
    let raw_weights = resolve_objective_weights(config, inputs.objective_weights);
    let normalized = normalize_objective_weights(&raw_weights);
    let waste_weight = compute_waste_weights(&normalized, &prio.objective_to_waste);

    // Present
    let present = compute_present_severity(inputs.stages);

    // Edge
    let edge = compute_edge(
        &prio.edge_metrics,
        config.benchmarks_for(inputs.profile),
        inputs.measured,
    );

    if let Some(history) = inputs.history {
        debug!(entries = history.len(), "PACE history supplied (not used in scoring)");
    }

    // Combine over the union of wastes seen in severity, benefit or weight data
    let candidates: BTreeSet<Waste> = present
        .keys()
        .copied()
        .chain(inputs.benefits.iter().map(|(w, _)| w))
        .chain(waste_weight.keys().copied())
        .collect();

    let mut top_wastes: Vec<RankedWaste> = candidates
        .into_iter()
        .map(|waste| {
            let severity = present.get(&waste).copied().unwrap_or(0.0);
            let weight = waste_weight.get(&waste).copied().unwrap_or(0.0);
            let factor = edge.get(&waste).copied().unwrap_or(1.0);
            let benefit = inputs.benefits.get(waste).max(0.0);
            let score = combine(severity, weight, factor, benefit);
            debug!(%waste, severity, weight, edge = factor, benefit, score, "PACE score");
            RankedWaste { waste, score }
        })
        .collect();
    top_wastes.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let badge = compute_badge(&raw_weights, prio.kpi_badge.min_tracked);

    debug!(
        scored = top_wastes.len(),
        top = ?top_wastes.first().map(|r| r.waste),
        badge_tracked = badge.tracked,
        "PACE computed"
    );

    PaceResult {
        top_wastes,
        waste_weight,
        badge,
        edge,
    }
}

/// `(present/5) · (1 + waste_weight) · edge · log10(benefit + 10)`
pub fn combine(present_severity: f64, waste_weight: f64, edge_factor: f64, benefit: f64) -> f64 {
    (present_severity / MAX_SEVERITY)
        * (1.0 + waste_weight)
        * edge_factor
        * (benefit + BENEFIT_LOG_OFFSET).log10()
}

/// The supplied weights, or each objective's configured default when none
/// (or an empty set) are supplied.
pub fn resolve_objective_weights(
    config: &PaceConfig,
    supplied: Option<&ObjectiveWeights>,
) -> ObjectiveWeights {
    match supplied {
        Some(weights) if !weights.is_empty() => weights.clone(),
        _ => config.default_objective_weights(),
    }
}

/// Scale weights to sum to 1. A zero total is treated as 1 so an all-zero
/// set stays all-zero instead of dividing by zero.
pub fn normalize_objective_weights(weights: &ObjectiveWeights) -> ObjectiveWeights {
    let total: f64 = weights.values().sum();
    let total = if total == 0.0 { 1.0 } else { total };
    weights
        .iter()
        .map(|(id, w)| (id.clone(), w / total))
        .collect()
}

/// Σ over objectives of normalized weight × objective→waste coefficient.
///
/// Only wastes referenced by a weighted objective appear in the map.
pub fn compute_waste_weights(
    normalized: &ObjectiveWeights,
    matrix: &BTreeMap<String, BTreeMap<Waste, f64>>,
) -> BTreeMap<Waste, f64> {
    let mut waste_weight = BTreeMap::new();
    for (objective, weight) in normalized {
        let Some(row) = matrix.get(objective) else {
            continue;
        };
        for (&waste, coefficient) in row {
            *waste_weight.entry(waste).or_insert(0.0) += weight * coefficient;
        }
    }
    waste_weight
}

/// Summed top-3 severity per waste divided by the number of stages.
///
/// Wastes that appear in no stage's top-3 are absent from the map.
pub fn compute_present_severity(stages: &[StageAssessment]) -> BTreeMap<Waste, f64> {
    let mut totals: BTreeMap<Waste, f64> = BTreeMap::new();
    for stage in stages {
        for pick in stage.top3() {
            *totals.entry(pick.waste).or_insert(0.0) += pick.severity;
        }
    }
    let divisor = stages.len().max(1) as f64;
    totals.values_mut().for_each(|v| *v /= divisor);
    totals
}

/// Readiness badge from the raw (un-normalized) objective weights.
///
/// The median is the upper middle element of the sorted weights; every
/// objective at or above it counts as tracked. An empty set counts as a
/// single objective of weight 1.
pub fn compute_badge(raw_weights: &ObjectiveWeights, min_tracked: usize) -> Badge {
    let mut weights: Vec<f64> = raw_weights.values().copied().collect();
    if weights.is_empty() {
        weights.push(1.0);
    }
    weights.sort_by(f64::total_cmp);
    let median = weights[weights.len() / 2];
    let tracked = weights.iter().filter(|&&w| w >= median).count();

    Badge {
        enabled: tracked >= min_tracked,
        tracked,
        required: min_tracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WastePick;

    fn objectives(pairs: &[(&str, f64)]) -> ObjectiveWeights {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    fn stage(name: &str, picks: &[(Waste, f64)], confidence: f64) -> StageAssessment {
        StageAssessment::new(
            name,
            picks.iter().map(|&(w, s)| WastePick::new(w, s)).collect(),
            confidence,
        )
        .unwrap()
    }

    fn config() -> PaceConfig {
        PaceConfig::builtin().unwrap()
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let normalized = normalize_objective_weights(&objectives(&[("cost", 1.5), ("quality", 0.5)]));
        assert_eq!(normalized["cost"], 0.75);
        assert_eq!(normalized["quality"], 0.25);
    }

    #[test]
    fn test_normalize_all_zero_stays_zero() {
        let normalized = normalize_objective_weights(&objectives(&[("cost", 0.0), ("quality", 0.0)]));
        assert!(normalized.values().all(|&w| w == 0.0));
    }

    #[test]
    fn test_empty_supplied_weights_fall_back_to_defaults() {
        let config = config();
        let empty = ObjectiveWeights::new();
        let resolved = resolve_objective_weights(&config, Some(&empty));
        assert_eq!(resolved, config.default_objective_weights());
        assert_eq!(resolved.len(), config.prioritization.critical_objectives.len());
    }

    #[test]
    fn test_waste_weights_accumulate_across_objectives() {
        let matrix: BTreeMap<String, BTreeMap<Waste, f64>> = [
            ("cost".to_string(), [(Waste::Defects, 0.4), (Waste::Inventory, 1.0)].into_iter().collect()),
            ("quality".to_string(), [(Waste::Defects, 1.0)].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        let normalized = objectives(&[("cost", 0.5), ("quality", 0.5), ("unmapped", 0.0)]);
        let weights = compute_waste_weights(&normalized, &matrix);
        assert!((weights[&Waste::Defects] - 0.7).abs() < 1e-12);
        assert!((weights[&Waste::Inventory] - 0.5).abs() < 1e-12);
        assert!(!weights.contains_key(&Waste::Waiting));
    }

    #[test]
    fn test_present_severity_averages_over_all_stages() {
        let stages = vec![
            stage("Production", &[(Waste::Defects, 4.0), (Waste::Waiting, 2.0)], 1.0),
            stage("Finishing/Pack", &[(Waste::Defects, 2.0)], 0.5),
        ];
        let present = compute_present_severity(&stages);
        assert_eq!(present[&Waste::Defects], 3.0);
        assert_eq!(present[&Waste::Waiting], 1.0);
        assert!(!present.contains_key(&Waste::Safety));
    }

    #[test]
    fn test_badge_counts_weights_at_or_above_median() {
        // sorted [0.5, 1.0, 1.0, 1.5, 2.0] → median 1.0 → 4 tracked
        let weights = objectives(&[("a", 1.0), ("b", 2.0), ("c", 0.5), ("d", 1.0), ("e", 1.5)]);
        let badge = compute_badge(&weights, 4);
        assert_eq!(badge.tracked, 4);
        assert!(badge.enabled);
    }

    #[test]
    fn test_badge_uses_upper_median_for_even_counts() {
        // sorted [0.2, 0.4, 1.8, 2.0] → upper median 1.8 → 2 tracked
        let weights = objectives(&[("a", 0.2), ("b", 2.0), ("c", 0.4), ("d", 1.8)]);
        let badge = compute_badge(&weights, 4);
        assert_eq!(badge.tracked, 2);
        assert!(!badge.enabled);
        assert_eq!(badge.required, 4);
    }

    #[test]
    fn test_badge_with_no_objectives() {
        let badge = compute_badge(&ObjectiveWeights::new(), 4);
        assert_eq!(badge.tracked, 1);
        assert!(!badge.enabled);
    }

    #[test]
    fn test_defects_outrank_waiting_in_reference_scenario() {
        let config = config();
        let stages = vec![stage(
            "Production",
            &[(Waste::Defects, 5.0), (Waste::Waiting, 2.0), (Waste::Motion, 1.0)],
            1.0,
        )];
        let benefits: BenefitEstimate =
            [(Waste::Defects, 100_000.0), (Waste::Waiting, 20_000.0)].into_iter().collect();
        let weights = objectives(&[("cost", 1.0), ("quality", 1.0)]);

        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.objective_weights = Some(&weights);
        let pace = compute_pace(&config, &inputs);

        assert!(pace.edge.values().all(|&f| f == 1.0));
        assert_eq!(pace.top_wastes[0].waste, Waste::Defects);
        let defects = pace.rank_of(Waste::Defects).unwrap();
        let waiting = pace.rank_of(Waste::Waiting).unwrap();
        assert!(defects < waiting);

        // defects: (5/5) · (1 + 0.5·0.4 + 0.5·1.0) · 1 · log10(100010)
        let expected = 1.7 * 100_010.0_f64.log10();
        assert!((pace.top_wastes[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_union_includes_benefit_only_and_weight_only_wastes() {
        let config = config();
        let stages = vec![stage("Production", &[(Waste::Defects, 3.0)], 1.0)];
        let benefits: BenefitEstimate = [(Waste::Safety, 5_000.0)].into_iter().collect();
        let weights = objectives(&[("cash", 1.0)]);

        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.objective_weights = Some(&weights);
        let pace = compute_pace(&config, &inputs);

        let scored: BTreeSet<Waste> = pace.top_wastes.iter().map(|r| r.waste).collect();
        let expected: BTreeSet<Waste> =
            [Waste::Defects, Waste::Safety, Waste::Inventory, Waste::Overproduction]
                .into_iter()
                .collect();
        assert_eq!(scored, expected);
        // No severity → zero score, ties keep canonical order
        let tail: Vec<Waste> = pace.top_wastes[1..].iter().map(|r| r.waste).collect();
        assert_eq!(tail, vec![Waste::Inventory, Waste::Overproduction, Waste::Safety]);
    }

    #[test]
    fn test_measured_metrics_move_the_score() {
        let config = config();
        let stages = vec![stage("Production", &[(Waste::Defects, 4.0)], 1.0)];
        let benefits = BenefitEstimate::new();
        let measured: MeasuredMetrics =
            [("first_pass_yield_pct".to_string(), 80.0)].into_iter().collect();

        let neutral = compute_pace(&config, &PaceInputs::new(&stages, &benefits));
        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.profile = Some("general_manufacturing");
        inputs.measured = Some(&measured);
        let adjusted = compute_pace(&config, &inputs);

        assert!(adjusted.edge[&Waste::Defects] < 1.0);
        assert!(adjusted.top_wastes[0].score < neutral.top_wastes[0].score);
    }

    #[test]
    fn test_empty_inputs_give_empty_ranking() {
        let config = config();
        let benefits = BenefitEstimate::new();
        let empty = ObjectiveWeights::new();
        let mut inputs = PaceInputs::new(&[], &benefits);
        inputs.objective_weights = Some(&empty);
        let pace = compute_pace(&PaceConfig::default(), &inputs);
        assert!(pace.is_empty());
        assert_eq!(pace.badge.tracked, 1);

        // With the bundle's objectives the weight data alone is scored at 0
        let with_objectives = compute_pace(&config, &inputs);
        let ranked: Vec<Waste> = with_objectives.top_wastes.iter().map(|r| r.waste).collect();
        let weighted: Vec<Waste> = with_objectives.waste_weight.keys().copied().collect();
        assert!(!ranked.is_empty());
        assert_eq!(ranked, weighted);
        assert!(with_objectives.top_wastes.iter().all(|r| r.score == 0.0));
        assert_eq!(with_objectives.badge.tracked, 6);
        assert!(with_objectives.badge.enabled);
    }

    #[test]
    fn test_history_does_not_change_result() {
        let config = config();
        let stages = vec![stage("Production", &[(Waste::Waiting, 3.0)], 0.9)];
        let benefits: BenefitEstimate = [(Waste::Waiting, 40_000.0)].into_iter().collect();
        let first = compute_pace(&config, &PaceInputs::new(&stages, &benefits));

        let history = vec![first.clone()];
        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.history = Some(&history);
        assert_eq!(compute_pace(&config, &inputs), first);
    }
}
