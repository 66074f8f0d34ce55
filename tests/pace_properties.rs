//! Property tests for the PACE engine invariants
//!
//! Random stage assessments, benefits, objective weights and measurements
//! against the embedded template bundle.

use std::collections::{BTreeMap, BTreeSet};

use kafaa_pace::config::defaults::{DEFAULT_STAGES, EDGE_FACTOR_MAX, EDGE_FACTOR_MIN};
use kafaa_pace::pace::combiner::{compute_present_severity, normalize_objective_weights};
use kafaa_pace::pace::edge::edge_factor_from_ratio;
use kafaa_pace::types::{
    BenefitEstimate, MeasuredMetrics, ObjectiveWeights, Priority, StageAssessment, Waste,
};
use kafaa_pace::{compute_pace, propose_countermeasures, PaceConfig, PaceInputs, SelectionOptions};
use proptest::prelude::*;

fn arb_waste() -> impl Strategy<Value = Waste> {
    prop::sample::select(Waste::ALL.to_vec())
}

/// One stage per distinct stage index, scores from a full severity grid.
fn arb_stages() -> impl Strategy<Value = Vec<StageAssessment>> {
    prop::collection::btree_map(
        0..DEFAULT_STAGES.len(),
        (
            prop::collection::btree_map(arb_waste(), 0.0_f64..=5.0, 0..6),
            0.1_f64..=1.0,
        ),
        0..5,
    )
    .prop_map(|stages| {
        stages
            .into_iter()
            .map(|(i, (scores, confidence))| {
                StageAssessment::from_scores(DEFAULT_STAGES[i], &scores, confidence).unwrap()
            })
            .collect()
    })
}

fn arb_benefits() -> impl Strategy<Value = BenefitEstimate> {
    prop::collection::btree_map(arb_waste(), 0.0_f64..1_000_000.0, 0..8)
        .prop_map(BenefitEstimate::from)
}

fn arb_weights() -> impl Strategy<Value = ObjectiveWeights> {
    let ids = ["cost", "quality", "delivery", "safety", "productivity", "cash"];
    prop::collection::btree_map(prop::sample::select(ids.to_vec()), 0.0_f64..=2.0, 0..6)
        .prop_map(|m| m.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn arb_measured() -> impl Strategy<Value = MeasuredMetrics> {
    let keys = [
        "first_pass_yield_pct",
        "oee_pct",
        "inventory_turns",
        "otif_pct",
        "units_per_labor_hour",
        "trir",
    ];
    prop::collection::btree_map(prop::sample::select(keys.to_vec()), 0.0_f64..200.0, 0..6)
        .prop_map(|m| m.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn arb_profile() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec![
        "general_manufacturing",
        "food_beverage",
        "logistics_warehousing",
    ]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn edge_factor_always_within_bounds(ratio in prop::num::f64::ANY) {
        let factor = edge_factor_from_ratio(ratio);
        prop_assert!((EDGE_FACTOR_MIN..=EDGE_FACTOR_MAX).contains(&factor), "ratio {ratio} → {factor}");
    }

    #[test]
    fn normalized_weights_sum_to_one(weights in arb_weights()) {
        let normalized = normalize_objective_weights(&weights);
        let total: f64 = normalized.values().sum();
        if weights.values().any(|&w| w > 0.0) {
            prop_assert!((total - 1.0).abs() < 1e-9, "sum = {total}");
        } else {
            prop_assert_eq!(total, 0.0);
        }
    }

    #[test]
    fn present_severity_stays_within_scale(stages in arb_stages()) {
        let present = compute_present_severity(&stages);
        prop_assert!(present.values().all(|&p| (0.0..=5.0).contains(&p)));
    }

    #[test]
    fn pace_ranking_is_a_nonnegative_permutation_of_inputs(
        stages in arb_stages(),
        benefits in arb_benefits(),
        weights in arb_weights(),
        measured in arb_measured(),
        profile in arb_profile(),
    ) {
        let config = PaceConfig::builtin().unwrap();
        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.objective_weights = Some(&weights);
        inputs.measured = Some(&measured);
        inputs.profile = profile;
        let pace = compute_pace(&config, &inputs);

        prop_assert!(pace.top_wastes.iter().all(|r| r.score >= 0.0));
        prop_assert!(pace.top_wastes.windows(2).all(|w| w[0].score >= w[1].score));
        prop_assert!(pace.edge.values().all(|f| (EDGE_FACTOR_MIN..=EDGE_FACTOR_MAX).contains(f)));

        let mut expected: BTreeSet<Waste> = stages
            .iter()
            .flat_map(|s| s.top3().iter().map(|p| p.waste))
            .collect();
        expected.extend(benefits.iter().map(|(w, _)| w));
        expected.extend(pace.waste_weight.keys().copied());
        let ranked: Vec<Waste> = pace.top_wastes.iter().map(|r| r.waste).collect();
        let unique: BTreeSet<Waste> = ranked.iter().copied().collect();
        prop_assert_eq!(ranked.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn action_plan_invariants(
        stages in arb_stages(),
        benefits in arb_benefits(),
        weights in arb_weights(),
        profile in arb_profile(),
        max_per_stage in 1_usize..=5,
        include_generic in any::<bool>(),
    ) {
        let config = PaceConfig::builtin().unwrap();
        let mut inputs = PaceInputs::new(&stages, &benefits);
        inputs.objective_weights = Some(&weights);
        inputs.profile = profile;
        let pace = compute_pace(&config, &inputs);

        let options = SelectionOptions { max_per_stage, profile, include_generic };
        let actions = propose_countermeasures(&config, &stages, &benefits, &options, Some(&pace));

        let mut per_stage: BTreeMap<&str, usize> = BTreeMap::new();
        for action in &actions {
            *per_stage.entry(action.stage.as_str()).or_insert(0) += 1;
        }
        prop_assert!(per_stage.values().all(|&n| n <= max_per_stage));

        let ranks: Vec<usize> = actions.iter().map(|a| a.rank).collect();
        prop_assert_eq!(ranks, (1..=actions.len()).collect::<Vec<_>>());

        let ranks_by_waste = pace.rank_map();
        for action in &actions {
            prop_assert!(action.est_annual_benefit >= 0.0);
            if ranks_by_waste.get(&action.waste).is_some_and(|&r| r <= 2) {
                prop_assert_eq!(action.priority, Priority::Now);
            }
        }

        // Same inputs, same plan
        let again = propose_countermeasures(&config, &stages, &benefits, &options, Some(&pace));
        prop_assert_eq!(actions, again);
    }
}
