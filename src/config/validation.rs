//! Template validation: unknown-key detection with Levenshtein suggestions
//! and cross-reference / range checks.
//!
//! Two-pass parse approach: first walk the raw TOML tree and compare every
//! key path against the known schema (dynamic levels such as objective ids,
//! profile keys and metric keys are wildcards, waste levels must name a
//! waste). Unknown keys are rejected. Then the typed structs are
//! deserialized and checked for consistency.

use std::collections::{BTreeSet, HashSet};

use crate::types::Waste;

/// A config finding with an optional "did you mean" hint.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Matches any key at this level (ids, profile keys, metric keys).
const ANY: &str = "*";

/// Matches a waste category name.
const WASTE: &str = "<waste>";

/// Returns the schema of valid dotted key paths for `PaceConfig`.
///
/// Maintained manually to match the struct hierarchy in pace_config.rs and
/// `Countermeasure`. Any new field must be added here too.
pub fn known_config_keys() -> Vec<&'static str> {
    vec![
        // [assumptions]
        "assumptions",
        "assumptions.currency",
        // [value_chain]
        "value_chain",
        "value_chain.stages",
        // [prioritization]
        "prioritization",
        "prioritization.critical_objectives",
        "prioritization.critical_objectives.id",
        "prioritization.critical_objectives.name",
        "prioritization.critical_objectives.weight",
        "prioritization.objective_to_waste",
        "prioritization.objective_to_waste.*",
        "prioritization.objective_to_waste.*.<waste>",
        "prioritization.edge_metrics",
        "prioritization.edge_metrics.<waste>",
        "prioritization.edge_metrics.<waste>.key",
        "prioritization.edge_metrics.<waste>.unit",
        "prioritization.edge_metrics.<waste>.higher_is_better",
        "prioritization.kpi_badge",
        "prioritization.kpi_badge.min_tracked",
        // [profiles.<key>]
        "profiles",
        "profiles.*",
        "profiles.*.label",
        "profiles.*.benchmarks",
        "profiles.*.benchmarks.*",
        // [[countermeasures.<waste>]]
        "countermeasures",
        "countermeasures.<waste>",
        "countermeasures.<waste>.name",
        "countermeasures.<waste>.desc",
        "countermeasures.<waste>.effort",
        "countermeasures.<waste>.impact_pct",
        "countermeasures.<waste>.kpi",
        "countermeasures.<waste>.pre",
        // [[countermeasures_profiles.<key>.<waste>]]
        "countermeasures_profiles",
        "countermeasures_profiles.*",
        "countermeasures_profiles.*.<waste>",
        "countermeasures_profiles.*.<waste>.name",
        "countermeasures_profiles.*.<waste>.desc",
        "countermeasures_profiles.*.<waste>.effort",
        "countermeasures_profiles.*.<waste>.impact_pct",
        "countermeasures_profiles.*.<waste>.kpi",
        "countermeasures_profiles.*.<waste>.pre",
    ]
}

fn schema() -> Vec<Vec<&'static str>> {
    known_config_keys()
        .into_iter()
        .map(|k| k.split('.').collect())
        .collect()
}

fn is_waste_name(segment: &str) -> bool {
    segment.parse::<Waste>().is_ok()
}

fn segment_matches(pattern: &str, segment: &str) -> bool {
    match pattern {
        ANY => true,
        WASTE => is_waste_name(segment),
        literal => literal == segment,
    }
}

fn is_known(path: &[String], schema: &[Vec<&str>]) -> bool {
    schema.iter().any(|pattern| {
        pattern.len() == path.len()
            && pattern
                .iter()
                .zip(path)
                .all(|(p, s)| segment_matches(p, s))
    })
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest candidate within edit distance 3, if any.
fn closest<'a>(word: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<(&'a str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let dist = levenshtein(word, candidate);
        if dist <= 3 && best.map_or(true, |(_, d)| dist < d) {
            best = Some((candidate, dist));
        }
    }
    best
}

/// Closest candidate to `word` (edit distance ≤ 3), for "did you mean" hints
/// on names outside the key schema such as stage or objective ids.
pub fn did_you_mean<'a>(word: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    closest(word, candidates).map(|(s, _)| s.to_string())
}

/// Suggest a corrected key path for an unknown key.
///
/// Only paths that differ from a schema entry in exactly one segment are
/// considered; that segment is compared against the literal (or the waste
/// names) within edit distance 3.
pub fn suggest_correction(path: &[String]) -> Option<String> {
    let mut best: Option<(Vec<String>, usize)> = None;

    for pattern in schema() {
        if pattern.len() != path.len() {
            continue;
        }
        let mismatches: Vec<usize> = pattern
            .iter()
            .zip(path)
            .enumerate()
            .filter(|(_, (p, s))| !segment_matches(p, s))
            .map(|(i, _)| i)
            .collect();
        let [i] = mismatches.as_slice() else {
            continue;
        };

        let found = match pattern[*i] {
            WASTE => closest(&path[*i], Waste::ALL.iter().map(|w| w.as_str())),
            ANY => None,
            literal => closest(&path[*i], [literal]),
        };
        if let Some((fix, dist)) = found {
            if best.as_ref().map_or(true, |(_, d)| dist < *d) {
                let mut corrected = path.to_vec();
                corrected[*i] = fix.to_string();
                best = Some((corrected, dist));
            }
        }
    }

    best.map(|(p, _)| p.join("."))
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Walk a parsed TOML document and report every key the schema does not know.
///
/// Children of an unknown key are not reported separately. Arrays of tables
/// are checked element by element under the array's own path.
pub fn validate_unknown_keys(value: &toml::Value) -> Vec<ValidationIssue> {
    let schema = schema();
    let mut issues = Vec::new();
    if let Some(table) = value.as_table() {
        check_table(table, &mut Vec::new(), &schema, &mut issues);
    }
    issues
}

fn check_table(
    table: &toml::Table,
    prefix: &mut Vec<String>,
    schema: &[Vec<&str>],
    issues: &mut Vec<ValidationIssue>,
) {
    for (key, value) in table {
        prefix.push(key.clone());
        if is_known(prefix, schema) {
            match value {
                toml::Value::Table(inner) => check_table(inner, prefix, schema, issues),
                toml::Value::Array(items) => {
                    for item in items {
                        if let toml::Value::Table(inner) = item {
                            check_table(inner, prefix, schema, issues);
                        }
                    }
                }
                _ => {}
            }
        } else {
            let field = prefix.join(".");
            issues.push(ValidationIssue {
                message: format!("Unknown config key '{field}'"),
                suggestion: suggest_correction(prefix),
                field,
            });
        }
        prefix.pop();
    }
}

// ============================================================================
// Semantic Validation
// ============================================================================

/// Validate cross-references and value ranges on a parsed `PaceConfig`.
///
/// Returns (errors, warnings). Errors make the bundle unusable; warnings
/// are suspicious but not fatal.
pub fn validate_semantics(
    config: &super::PaceConfig,
) -> (Vec<String>, Vec<ValidationIssue>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.assumptions.currency.trim().is_empty() {
        errors.push("assumptions.currency must not be empty".to_string());
    }

    // Stages
    let stages = &config.value_chain.stages;
    if stages.is_empty() {
        errors.push("value_chain.stages must list at least one stage".to_string());
    }
    let mut seen_stages = HashSet::new();
    for stage in stages {
        if stage.trim().is_empty() {
            errors.push("value_chain.stages contains an empty stage name".to_string());
        } else if !seen_stages.insert(stage.as_str()) {
            errors.push(format!("value_chain.stages lists '{stage}' more than once"));
        }
    }

    // Objectives
    let prio = &config.prioritization;
    let mut objective_ids = BTreeSet::new();
    for objective in &prio.critical_objectives {
        if objective.id.trim().is_empty() {
            errors.push("prioritization.critical_objectives: id must not be empty".to_string());
        } else if !objective_ids.insert(objective.id.as_str()) {
            errors.push(format!(
                "prioritization.critical_objectives: duplicate id '{}'",
                objective.id
            ));
        }
        if !(0.0..=super::defaults::MAX_OBJECTIVE_WEIGHT).contains(&objective.weight) {
            errors.push(format!(
                "prioritization.critical_objectives.{}.weight = {} is outside 0-2",
                objective.id, objective.weight
            ));
        }
    }
    if prio.critical_objectives.is_empty() {
        warnings.push(ValidationIssue::warning(
            "prioritization.critical_objectives",
            "No critical objectives declared; waste weights will all be 0",
        ));
    } else if prio.critical_objectives.iter().all(|o| o.weight == 0.0) {
        warnings.push(ValidationIssue::warning(
            "prioritization.critical_objectives",
            "All objective weights are 0; the Critical factor has no effect",
        ));
    }
    if prio.kpi_badge.min_tracked == 0 {
        errors.push("prioritization.kpi_badge.min_tracked must be > 0".to_string());
    } else if prio.kpi_badge.min_tracked > prio.critical_objectives.len().max(1) {
        warnings.push(ValidationIssue::warning(
            "prioritization.kpi_badge.min_tracked",
            format!(
                "min_tracked = {} exceeds the {} declared objectives; the badge can never be enabled",
                prio.kpi_badge.min_tracked,
                prio.critical_objectives.len()
            ),
        ));
    }

    // Objective → waste matrix
    for (objective, row) in &prio.objective_to_waste {
        if !objective_ids.contains(objective.as_str()) {
            let hint = closest(objective, objective_ids.iter().copied())
                .map(|(s, _)| format!(", did you mean '{s}'?"))
                .unwrap_or_default();
            errors.push(format!(
                "prioritization.objective_to_waste.{objective} refers to an undeclared objective{hint}"
            ));
        }
        for (waste, coefficient) in row {
            if !coefficient.is_finite() || *coefficient < 0.0 {
                errors.push(format!(
                    "prioritization.objective_to_waste.{objective}.{waste} = {coefficient} must be a finite value >= 0"
                ));
            }
        }
    }
    for objective in &prio.critical_objectives {
        if !prio.objective_to_waste.contains_key(&objective.id) {
            warnings.push(ValidationIssue::warning(
                format!("prioritization.objective_to_waste.{}", objective.id),
                format!("Objective '{}' has no waste coefficients and will not affect scores", objective.id),
            ));
        }
    }

    // Edge metrics
    for (waste, metric) in &prio.edge_metrics {
        if metric.key.trim().is_empty() {
            errors.push(format!("prioritization.edge_metrics.{waste}.key must not be empty"));
        } else if !config.profiles.is_empty()
            && !config
                .profiles
                .values()
                .any(|p| p.benchmarks.contains_key(&metric.key))
        {
            warnings.push(ValidationIssue::warning(
                format!("prioritization.edge_metrics.{waste}.key"),
                format!(
                    "Metric '{}' has no benchmark in any profile; its edge factor will stay 1.0",
                    metric.key
                ),
            ));
        }
    }

    // Profiles
    for (key, profile) in &config.profiles {
        if profile.label.trim().is_empty() {
            errors.push(format!("profiles.{key}.label must not be empty"));
        }
        for (metric, target) in &profile.benchmarks {
            if !target.is_finite() || *target < 0.0 {
                errors.push(format!(
                    "profiles.{key}.benchmarks.{metric} = {target} must be a finite value >= 0"
                ));
            }
        }
    }

    // Countermeasure libraries
    for (waste, entries) in &config.countermeasures {
        check_library_entries(&format!("countermeasures.{waste}"), entries, &mut errors);
    }
    for (profile, library) in &config.countermeasures_profiles {
        if !config.profiles.contains_key(profile) {
            let hint = closest(profile, config.profiles.keys().map(String::as_str))
                .map(|(s, _)| format!(", did you mean '{s}'?"))
                .unwrap_or_default();
            errors.push(format!(
                "countermeasures_profiles.{profile} refers to an undeclared profile{hint}"
            ));
        }
        for (waste, entries) in library {
            check_library_entries(
                &format!("countermeasures_profiles.{profile}.{waste}"),
                entries,
                &mut errors,
            );
        }
    }
    if !config.countermeasures.is_empty() {
        for waste in Waste::ALL {
            if config.countermeasures.get(&waste).map_or(true, Vec::is_empty) {
                warnings.push(ValidationIssue::warning(
                    format!("countermeasures.{waste}"),
                    format!("No generic countermeasures for {waste}"),
                ));
            }
        }
    }

    (errors, warnings)
}

fn check_library_entries(
    path: &str,
    entries: &[crate::types::Countermeasure],
    errors: &mut Vec<String>,
) {
    for (i, entry) in entries.iter().enumerate() {
        if entry.name.trim().is_empty() {
            errors.push(format!("{path}[{i}].name must not be empty"));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
