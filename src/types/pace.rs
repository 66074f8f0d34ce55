//! PACE prioritization output types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Waste;

/// A waste category with its combined PACE score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedWaste {
    pub waste: Waste,
    pub score: f64,
}

/// KPI readiness badge: how many objectives carry above-median weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub enabled: bool,
    pub tracked: usize,
    pub required: usize,
}

impl Badge {
    /// Progress toward the badge, capped at 1.0.
    pub fn progress(&self) -> f64 {
        (self.tracked as f64 / self.required.max(1) as f64).min(1.0)
    }
}

/// Result of one PACE computation.
///
/// Recomputed from scratch on every call; carries the intermediate maps so
/// reports can show where a ranking came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceResult {
    /// All scored wastes, highest score first
    pub top_wastes: Vec<RankedWaste>,
    /// Objective-derived weight per waste
    pub waste_weight: BTreeMap<Waste, f64>,
    pub badge: Badge,
    /// Benchmark-relative edge factor per configured waste metric
    pub edge: BTreeMap<Waste, f64>,
}

impl PaceResult {
    pub fn is_empty(&self) -> bool {
        self.top_wastes.is_empty()
    }

    /// 1-based rank of a waste, if it was scored.
    pub fn rank_of(&self, waste: Waste) -> Option<usize> {
        self.top_wastes
            .iter()
            .position(|r| r.waste == waste)
            .map(|i| i + 1)
    }

    /// The first `n` ranked wastes (fewer if fewer were scored).
    pub fn top(&self, n: usize) -> &[RankedWaste] {
        &self.top_wastes[..n.min(self.top_wastes.len())]
    }

    /// Rank lookup table for all scored wastes.
    pub fn rank_map(&self) -> BTreeMap<Waste, usize> {
        self.top_wastes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.waste, i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PaceResult {
        PaceResult {
            top_wastes: vec![
                RankedWaste { waste: Waste::Defects, score: 1.2 },
                RankedWaste { waste: Waste::Waiting, score: 0.4 },
            ],
            waste_weight: BTreeMap::new(),
            badge: Badge { enabled: false, tracked: 2, required: 4 },
            edge: BTreeMap::new(),
        }
    }

    #[test]
    fn test_rank_of_is_one_based() {
        let pace = sample();
        assert_eq!(pace.rank_of(Waste::Defects), Some(1));
        assert_eq!(pace.rank_of(Waste::Waiting), Some(2));
        assert_eq!(pace.rank_of(Waste::Safety), None);
        assert_eq!(pace.rank_map().get(&Waste::Waiting), Some(&2));
    }

    #[test]
    fn test_top_slices_safely() {
        let pace = sample();
        assert_eq!(pace.top(6).len(), 2);
        assert_eq!(pace.top(1)[0].waste, Waste::Defects);
    }

    #[test]
    fn test_badge_progress_caps_at_one() {
        let badge = Badge { enabled: true, tracked: 6, required: 4 };
        assert_eq!(badge.progress(), 1.0);
        assert_eq!(sample().badge.progress(), 0.5);
    }
}
