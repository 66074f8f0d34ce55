//! Config Validation Tests
//!
//! Typo detection on raw template TOML and range / cross-reference checks on
//! the typed bundle, exercised independently from the engine.

use kafaa_pace::config::validation::{
    known_config_keys, suggest_correction, validate_semantics, validate_unknown_keys,
};
use kafaa_pace::config::{ConfigError, PaceConfig, EMBEDDED_TEMPLATES};

fn unknown_keys(raw: &str) -> Vec<kafaa_pace::config::validation::ValidationIssue> {
    let table: toml::Table = raw.parse().unwrap();
    validate_unknown_keys(&toml::Value::Table(table))
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_edge_metric_field_is_reported_with_suggestion() {
    let issues = unknown_keys(
        r#"
[prioritization.edge_metrics.defects]
key = "first_pass_yield_pct"
higher_is_beter = true
"#,
    );
    assert_eq!(issues.len(), 1, "Expected exactly 1 issue");
    assert!(issues[0].field.contains("higher_is_beter"));
    assert_eq!(
        issues[0].suggestion.as_deref(),
        Some("prioritization.edge_metrics.defects.higher_is_better")
    );
}

#[test]
fn typo_in_countermeasure_waste_is_reported() {
    let issues = unknown_keys(
        r#"
[[countermeasures.overproducton]]
name = "Pull system"
"#,
    );
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].suggestion.as_deref(),
        Some("countermeasures.overproduction")
    );
}

#[test]
fn typo_in_profile_library_field_is_reported() {
    let issues = unknown_keys(
        r#"
[[countermeasures_profiles.food_beverage.defects]]
name = "HACCP refresh"
efort = "low"
"#,
    );
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].suggestion.as_deref(),
        Some("countermeasures_profiles.food_beverage.defects.effort")
    );
}

#[test]
fn embedded_bundle_has_no_unknown_keys() {
    let issues = unknown_keys(EMBEDDED_TEMPLATES);
    assert!(issues.is_empty(), "Unexpected issues: {issues:?}");
}

#[test]
fn capitalized_waste_names_are_accepted() {
    let raw = r#"
[[countermeasures.Defects]]
name = "Poka-yoke at filling"
effort = "low"
impact_pct = [10, 20]
"#;
    assert!(unknown_keys(raw).is_empty());
    let config = PaceConfig::from_toml_str(raw, "test").unwrap();
    assert_eq!(
        config.countermeasures[&kafaa_pace::types::Waste::Defects][0].name,
        "Poka-yoke at filling"
    );
}

#[test]
fn unknown_section_has_no_suggestion() {
    let issues = unknown_keys(
        r#"
[slides]
theme = "dark"
"#,
    );
    assert_eq!(issues.len(), 1, "Children of an unknown section are not repeated");
    assert_eq!(issues[0].field, "slides");
    assert!(issues[0].suggestion.is_none());
}

#[test]
fn multiple_typos_are_all_reported() {
    let issues = unknown_keys(
        r#"
[assumptions]
curency = "SAR"

[prioritization.kpi_badge]
min_traked = 4

[profiles.general_manufacturing]
lable = "General"
"#,
    );
    assert_eq!(issues.len(), 3);
    assert!(issues.iter().all(|i| i.suggestion.is_some()));
}

#[test]
fn suggest_correction_handles_top_level_typo() {
    let path: Vec<String> = vec!["profils".into()];
    assert_eq!(suggest_correction(&path).as_deref(), Some("profiles"));
}

#[test]
fn known_keys_include_every_countermeasure_field() {
    let keys = known_config_keys();
    for field in ["name", "desc", "effort", "impact_pct", "kpi", "pre"] {
        let generic = format!("countermeasures.<waste>.{field}");
        let specific = format!("countermeasures_profiles.*.<waste>.{field}");
        assert!(keys.iter().any(|k| *k == generic), "missing {generic}");
        assert!(keys.iter().any(|k| *k == specific), "missing {specific}");
    }
}

// ============================================================================
// Range and Cross-Reference Validation
// ============================================================================

#[test]
fn builtin_bundle_has_no_errors_or_warnings() {
    let config = PaceConfig::builtin().unwrap();
    let (errors, warnings) = validate_semantics(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn objective_weight_above_two_is_rejected() {
    let raw = r#"
[[prioritization.critical_objectives]]
id = "cost"
name = "Cost"
weight = 2.5
"#;
    let err = PaceConfig::from_toml_str(raw, "test").unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.iter().any(|e| e.contains("outside 0-2")), "{errors:?}");
}

#[test]
fn matrix_row_for_undeclared_objective_is_rejected() {
    let raw = r#"
[[prioritization.critical_objectives]]
id = "quality"
name = "Quality"

[prioritization.objective_to_waste.qualty]
defects = 1.0
"#;
    let err = PaceConfig::from_toml_str(raw, "test").unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.iter().any(|e| e.contains("qualty")), "{errors:?}");
}

#[test]
fn empty_stage_list_and_zero_badge_are_rejected() {
    let raw = r#"
[value_chain]
stages = []

[prioritization.kpi_badge]
min_tracked = 0
"#;
    let err = PaceConfig::from_toml_str(raw, "test").unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn impact_range_with_three_values_is_a_parse_error() {
    let raw = r#"
[[countermeasures.waiting]]
name = "SMED"
impact_pct = [10, 20, 30]
"#;
    assert!(matches!(
        PaceConfig::from_toml_str(raw, "test"),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn validation_error_display_lists_every_problem() {
    let raw = r#"
[assumptions]
currency = ""

[value_chain]
stages = ["Production", "Production"]
"#;
    let err = PaceConfig::from_toml_str(raw, "test").unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("Config validation failed:"));
    assert!(text.contains("currency"));
    assert!(text.contains("more than once"));
}

#[test]
fn edited_bundle_survives_save_and_reload() {
    let mut config = PaceConfig::builtin().unwrap();
    config.assumptions.currency = "AED".to_string();
    config.prioritization.kpi_badge.min_tracked = 3;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.toml");
    config.save_to_file(&path).unwrap();

    let reloaded = PaceConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded.currency(), "AED");
    assert_eq!(reloaded.prioritization.kpi_badge.min_tracked, 3);
    assert_eq!(reloaded, config);
}
