//! Rule engine integration tests
//!
//! Runs the sample configuration in `config/rules.json` end to end.

use fieldrules_core::FieldValue;
use fieldrules_engine::{FileRuleSource, RuleEngine, RuleKind, StaticRuleSource};
use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

fn sample_rules() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/rules.json")
}

fn sample_engine() -> RuleEngine {
    RuleEngine::new(FileRuleSource::new(sample_rules()))
}

fn apply(engine: &RuleEngine, field: &str, value: &str) -> Option<String> {
    engine.apply_rules(field, value)
}

#[test]
fn test_sample_configuration_loads() {
    let engine = sample_engine();
    let rule_set = engine.rule_set();

    assert_eq!(rule_set.len(), 13);
    assert_eq!(rule_set.metadata()["version"], "2.0");
    assert_eq!(engine.rules_for_field("age").len(), 3);
    assert!(engine.rules_for_field("unknown").is_empty());
    // disabled rules are loaded but never indexed
    assert!(engine.rules_for_field("salary").is_empty());
}

#[test]
fn test_priority_order() {
    let engine = sample_engine();

    let ids: Vec<String> = engine
        .rules_for_field("name")
        .iter()
        .map(|rule| rule.id.clone())
        .collect();
    assert_eq!(ids, vec!["mask-chen", "mask-david-thomas", "uppercase-name"]);

    assert_eq!(apply(&engine, "name", "Michael Chen").as_deref(), Some("*********"));
    assert_eq!(apply(&engine, "name", "David Thomas").as_deref(), Some("*******"));
    assert_eq!(apply(&engine, "name", "John Doe").as_deref(), Some("JOHN DOE"));
}

#[test]
fn test_mask_short_circuit_skips_later_rules() {
    let engine = sample_engine();

    assert_eq!(apply(&engine, "name", "Michael Chen-Smith").as_deref(), Some("*********"));
    assert_eq!(apply(&engine, "name", "cheng").as_deref(), Some("*********"));
    assert_eq!(apply(&engine, "name", "DAVID THOMAS").as_deref(), Some("*******"));

    let metrics = engine.rule_metrics();
    assert_eq!(metrics["mask-chen"].execution_count, 2);
    assert_eq!(metrics["mask-david-thomas"].execution_count, 1);
    assert_eq!(metrics["uppercase-name"].execution_count, 0);
}

#[test]
fn test_categorize_age_bands() {
    let engine = sample_engine();

    for (age, expected) in [
        ("18", "Young"),
        ("25", "Young"),
        ("26", "Adult"),
        ("40", "Adult"),
        ("41", "Senior"),
        ("65", "Senior"),
    ] {
        assert_eq!(apply(&engine, "age", age).as_deref(), Some(expected), "age {}", age);
    }

    assert_eq!(engine.apply_rules("age", 30i64).as_deref(), Some("Adult"));
    assert_eq!(apply(&engine, "age", "abc").as_deref(), Some("abc"));
}

#[test]
fn test_validate_rules() {
    let engine = sample_engine();

    assert_eq!(apply(&engine, "email", "test@example.com").as_deref(), Some("test@example.com"));
    assert_eq!(apply(&engine, "email", "invalid-email"), None);

    assert_eq!(apply(&engine, "phone", "555-123-4567").as_deref(), Some("555-123-4567"));
    assert_eq!(apply(&engine, "phone", "invalid").as_deref(), Some("000-000-0000"));
}

#[test]
fn test_format_rules() {
    let engine = sample_engine();

    assert_eq!(apply(&engine, "phone", "5551234567").as_deref(), Some("(555) 123-4567"));
    assert_eq!(apply(&engine, "birthDate", "2000-01-15").as_deref(), Some("01/15/2000"));
    assert_eq!(apply(&engine, "birthDate", "not-a-date").as_deref(), Some("not-a-date"));
    assert_eq!(apply(&engine, "birthDate", "2000-01-15T10:30:00").as_deref(), Some("01/15/2000"));
}

#[test]
fn test_replace_and_partial_mask() {
    let engine = sample_engine();

    assert_eq!(
        apply(&engine, "comments", "This contains badword1 in text").as_deref(),
        Some("This contains *** in text")
    );
    assert_eq!(
        apply(&engine, "comments", "This is clean text").as_deref(),
        Some("This is clean text")
    );
    assert_eq!(apply(&engine, "ssn", "123-45-6789").as_deref(), Some("XXX-XX-6789"));
    assert_eq!(apply(&engine, "ssn", "987-65-4321").as_deref(), Some("XXX-XX-4321"));
}

#[test]
fn test_null_and_empty_values() {
    let engine = sample_engine();

    assert_eq!(engine.apply_rules("name", FieldValue::Null), None);
    assert_eq!(engine.apply_rules("age", Option::<i64>::None), None);
    assert_eq!(apply(&engine, "name", "").as_deref(), Some(""));
}

#[test]
fn test_metrics_accumulate() {
    let engine = sample_engine();

    for _ in 0..5 {
        apply(&engine, "age", "30");
    }

    let metrics = engine.rule_metrics();
    assert_eq!(metrics.len(), 13);

    let adult = &metrics["age-adult"];
    assert_eq!(adult.execution_count, 5);
    assert_eq!(
        adult.average_execution_time_us,
        adult.total_execution_time_us as f64 / 5.0
    );
    // the category output no longer parses as an age
    assert_eq!(metrics["age-senior"].execution_count, 0);
    assert_eq!(metrics["format-salary"].execution_count, 0);
}

#[test]
fn test_reload_preserves_field_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::copy(sample_rules(), &path).unwrap();

    let engine = RuleEngine::new(FileRuleSource::new(&path));
    let before: Vec<(String, i32)> = engine
        .rules_for_field("name")
        .iter()
        .map(|rule| (rule.id.clone(), rule.priority))
        .collect();
    apply(&engine, "age", "30");

    let summary = engine.reload_rules().unwrap();
    assert_eq!(summary.previous, 13);
    assert_eq!(summary.current, 13);

    let after: Vec<(String, i32)> = engine
        .rules_for_field("name")
        .iter()
        .map(|rule| (rule.id.clone(), rule.priority))
        .collect();
    assert_eq!(before, after);

    // counters survive the swap
    assert_eq!(engine.rule_metrics()["age-adult"].execution_count, 1);
}

#[test]
fn test_reload_picks_up_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.yaml");
    std::fs::write(
        &path,
        "rules:\n  - id: upper\n    fieldName: city\n    type: TRANSFORM\n    enabled: true\n    action: UPPERCASE\n",
    )
    .unwrap();

    let engine = RuleEngine::new(FileRuleSource::new(&path));
    assert_eq!(apply(&engine, "city", "lisbon").as_deref(), Some("LISBON"));

    std::fs::write(
        &path,
        "rules:\n  - id: reverse\n    fieldName: city\n    type: TRANSFORM\n    enabled: true\n    action: REVERSE\n",
    )
    .unwrap();
    engine.reload_rules().unwrap();

    assert_eq!(apply(&engine, "city", "lisbon").as_deref(), Some("nobsil"));
    assert_eq!(engine.rules_for_field("city")[0].kind(), RuleKind::Transform);
}

#[test]
fn test_concurrent_reload_never_exposes_empty_set() {
    let engine = sample_engine();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    assert_eq!(apply(&engine, "age", "30").as_deref(), Some("Adult"));
                    assert_eq!(engine.rules_for_field("name").len(), 3);
                }
            });
        }

        for _ in 0..50 {
            engine.reload_rules().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });
}

#[test]
fn test_independent_engines_have_separate_metrics() {
    let json = std::fs::read_to_string(sample_rules()).unwrap();
    let first = RuleEngine::new(StaticRuleSource::from_json(&json).unwrap());
    let second = RuleEngine::new(StaticRuleSource::from_json(&json).unwrap());

    apply(&first, "age", "20");

    assert_eq!(first.rule_metrics()["age-young"].execution_count, 1);
    assert_eq!(second.rule_metrics()["age-young"].execution_count, 0);
}

proptest! {
    #[test]
    fn prop_fields_without_rules_pass_through(value in ".*", number in any::<i64>()) {
        let engine = sample_engine();

        prop_assert_eq!(engine.apply_rules("nickname", value.as_str()), Some(value.clone()));
        prop_assert_eq!(engine.apply_rules("nickname", number), Some(number.to_string()));
        prop_assert_eq!(engine.apply_rules("nickname", FieldValue::Null), None);
    }
}
