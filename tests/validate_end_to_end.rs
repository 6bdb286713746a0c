//! Course file → report → signals → verdict, through the public library API.

mod support;

use course_engine::policy::{load_preset, resolve_profile, SignalAction};
use course_engine::report::CapabilityReport;
use course_engine::signals::compute_course_signals;
use course_engine::validation::{evaluate, ActionSource, Severity, ValidationResult};
use support::fixtures::load_course;

fn validate(fixture: &str, preset: &str, profile: Option<&str>, strict: bool) -> ValidationResult {
    let course = load_course(fixture);
    let policy = load_preset(preset).unwrap();
    let resolved = resolve_profile(&policy, profile).unwrap();
    let report = CapabilityReport::from_course(&course);
    let signals = compute_course_signals(&course);
    evaluate(&resolved, &report, &signals, strict).unwrap()
}

fn rules(result: &ValidationResult) -> Vec<(&str, Option<&str>)> {
    result
        .issues
        .iter()
        .map(|i| (i.rule.as_str(), i.domain.as_deref()))
        .collect()
}

#[test]
fn test_full_mapping_passes_every_strict_preset() {
    for preset in ["baseline", "strict-ci", "higher-ed-example"] {
        let result = validate("full-mapping", preset, None, true);
        assert!(result.ok, "{} should pass: {:?}", preset, result.issues);
        assert!(result.issues.is_empty());
        assert!(result.resolved_signals.is_empty());
    }
}

#[test]
fn test_accreditation_requires_more_domains() {
    let result = validate("full-mapping", "higher-ed-example", Some("accreditation"), true);
    assert!(!result.ok);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].rule, "require_coverage");
    assert_eq!(result.issues[0].severity, Severity::Error);
    assert_eq!(
        result.issues[0].message,
        "Only 4 domains declared; minimum required is 6."
    );

    let relaxed = validate("full-mapping", "higher-ed-example", Some("accreditation"), false);
    assert!(relaxed.ok);
    assert_eq!(relaxed.issues[0].severity, Severity::Warning);
}

#[test]
fn test_thin_mapping_under_strict_ci() {
    let result = validate("thin-mapping", "strict-ci", None, true);

    assert!(!result.ok);
    assert_eq!(
        rules(&result),
        vec![
            ("forbid_empty_domains", Some("reflection")),
            ("min_coverage_items_per_domain", Some("reflection")),
            ("require_evidence", Some("ethics")),
            ("require_evidence", Some("reflection")),
        ]
    );
    assert!(result.issues.iter().all(|i| i.severity == Severity::Error));

    // SIG-INTENT-001 stays informational
    assert_eq!(result.resolved_signals.len(), 1);
    assert_eq!(result.resolved_signals[0].signal.id, "SIG-INTENT-001");
    assert_eq!(result.resolved_signals[0].action, SignalAction::Info);
}

#[test]
fn test_thin_mapping_non_strict_only_warns() {
    let result = validate("thin-mapping", "strict-ci", None, false);
    assert!(result.ok);
    assert_eq!(result.warnings().len(), 4);
    assert!(result.errors().is_empty());
}

#[test]
fn test_signal_error_gates_without_strict() {
    let result = validate("alignment-only", "strict-ci", None, false);

    assert!(!result.ok);
    let gated = result.signal_errors();
    assert_eq!(gated.len(), 1);
    assert_eq!(gated[0].signal.id, "SIG-MAP-001");
    assert_eq!(gated[0].action_source, ActionSource::Override);

    assert_eq!(
        rules(&result),
        vec![("signal:SIG-MAP-001", None), ("require_coverage", None)]
    );
    assert_eq!(result.issues[0].severity, Severity::Error);
    assert_eq!(result.issues[1].severity, Severity::Warning);
    assert!(result.issues[1]
        .message
        .contains("No capability_mapping present"));
}

#[test]
fn test_ignored_signal_never_surfaces() {
    let mut course = load_course("full-mapping");
    course.ai_scoping = None;

    let policy = load_preset("higher-ed-example").unwrap();
    let resolved = resolve_profile(&policy, Some("accreditation")).unwrap();
    let signals = compute_course_signals(&course);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].id, "SIG-AI-001");

    let result = evaluate(&resolved, &CapabilityReport::from_course(&course), &signals, false).unwrap();
    assert_eq!(result.resolved_signals[0].action, SignalAction::Ignore);
    assert_eq!(result.resolved_signals[0].action_source, ActionSource::Ignore);
    assert!(result
        .issues
        .iter()
        .all(|i| !i.rule.starts_with("signal:")));
}

#[test]
fn test_empty_mapping_is_thin() {
    let result = validate("empty-mapping", "strict-ci", None, false);
    let ids: Vec<&str> = result
        .resolved_signals
        .iter()
        .map(|s| s.signal.id.as_str())
        .collect();
    assert_eq!(ids, vec!["SIG-MAP-002"]);
    assert!(result.ok);
    assert!(rules(&result).contains(&("signal:SIG-MAP-002", None)));
    assert!(rules(&result).contains(&("require_coverage", None)));
}

#[test]
fn test_results_are_deterministic() {
    let first = validate("thin-mapping", "strict-ci", None, true);
    let second = validate("thin-mapping", "strict-ci", None, true);
    assert_eq!(
        serde_json::to_string(&first.to_json_value()).unwrap(),
        serde_json::to_string(&second.to_json_value()).unwrap()
    );
}

#[test]
fn test_persisted_report_round_trips_into_engine() {
    let course = load_course("thin-mapping");
    let report = CapabilityReport::from_course(&course);
    let persisted = report.to_json().unwrap();

    let reloaded = CapabilityReport::from_json(&persisted).unwrap();
    assert_eq!(reloaded.summary.gap_domains, vec!["reflection"]);

    let policy = load_preset("baseline").unwrap();
    let resolved = resolve_profile(&policy, None).unwrap();
    let result = evaluate(&resolved, &reloaded, &[], true).unwrap();
    assert!(result.ok);
}
