//! Edge percentiles: measured performance vs. industry benchmark

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::defaults::{EDGE_FACTOR_MAX, EDGE_FACTOR_MIN, EDGE_LOG_CLAMP, RATIO_EPSILON};
use crate::config::EdgeMetric;
use crate::types::{MeasuredMetrics, Waste};

/// Compute the per-waste edge factor for every configured metric.
///
/// A waste whose metric has no measurement or no benchmark target gets the
/// neutral factor 1.0. Otherwise the performance ratio (oriented so that
/// > 1 means better than benchmark) is log-dampened and clamped to
/// [0.7, 1.4].
pub fn compute_edge(
    edge_metrics: &BTreeMap<Waste, EdgeMetric>,
    benchmarks: Option<&BTreeMap<String, f64>>,
    measured: Option<&MeasuredMetrics>,
) -> BTreeMap<Waste, f64> {
    edge_metrics
        .iter()
        .map(|(&waste, metric)| {
            let target = benchmarks.and_then(|b| b.get(&metric.key)).copied();
            let value = measured.and_then(|m| m.get(&metric.key)).copied();

            let factor = match (value, target) {
                (Some(value), Some(target)) => {
                    let ratio = performance_ratio(value, target, metric.higher_is_better);
                    let factor = edge_factor_from_ratio(ratio);
                    debug!(%waste, key = %metric.key, value, target, ratio, factor, "Edge factor");
                    factor
                }
                _ => 1.0,
            };
            (waste, factor)
        })
        .collect()
}

/// Measured/target for higher-is-better metrics, target/measured otherwise.
fn performance_ratio(value: f64, target: f64, higher_is_better: bool) -> f64 {
    if higher_is_better {
        value / target
    } else {
        target / value.max(RATIO_EPSILON)
    }
}

/// `1 + clamp(ln(ratio), -0.4, 0.4)`, clamped to [0.7, 1.4].
///
/// Non-positive ratios are treated as the smallest positive ratio; a NaN
/// ratio carries no information and yields 1.0.
pub fn edge_factor_from_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 1.0;
    }
    let r = if ratio > 0.0 { ratio } else { RATIO_EPSILON };
    (1.0 + r.ln().clamp(-EDGE_LOG_CLAMP, EDGE_LOG_CLAMP)).clamp(EDGE_FACTOR_MIN, EDGE_FACTOR_MAX)
}
