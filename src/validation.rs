//! Validation engine: resolved profile + coverage report + signals → verdict.
//!
//! Rule violations are data, not errors. They come back as
//! [`ValidationIssue`]s and callers read [`ValidationResult::ok`] to learn the
//! outcome. The only hard failure is a malformed report.
//!
//! Structural issues are warnings unless `strict` is set. A signal the policy
//! resolves to `error` is always an error issue, whatever `strict` says, so a
//! policy can gate CI on one signal without turning on strict mode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EvaluationError;
use crate::policy::{ResolvedProfile, SignalAction, SignalsPolicy};
use crate::report::CapabilityReport;
use crate::signals::Signal;

const SIGNAL_WARN_FALLBACK: &str = "Review this signal and update course metadata if appropriate.";
const SIGNAL_ERROR_FALLBACK: &str = "Resolve this signal or adjust policy to avoid gating.";

/// Severity of a validation issue. Errors sort before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn for_structural(strict: bool) -> Self {
        if strict {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
        }
    }
}

/// A single explainable finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: Severity,
    pub domain: Option<String>,
    pub message: String,
    pub suggested_action: Option<String>,
}

impl ValidationIssue {
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            domain: None,
            message: message.into(),
            suggested_action: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_action = Some(suggestion.into());
        self
    }

    fn sort_key(&self) -> (Severity, &str, Option<&str>) {
        (self.severity, self.rule.as_str(), self.domain.as_deref())
    }
}

/// Which part of the signal policy decided an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSource {
    Ignore,
    Override,
    Default,
}

/// A computed signal paired with the action the policy assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSignal {
    #[serde(flatten)]
    pub signal: Signal,
    pub action: SignalAction,
    pub action_source: ActionSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub strict: bool,
    pub issues: Vec<ValidationIssue>,
    pub resolved_signals: Vec<ResolvedSignal>,
}

impl ValidationResult {
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect()
    }

    /// Signals the policy escalated to `error`.
    pub fn signal_errors(&self) -> Vec<&ResolvedSignal> {
        self.resolved_signals
            .iter()
            .filter(|s| s.action == SignalAction::Error)
            .collect()
    }

    /// Count of resolved signals per action; every action is present.
    pub fn signal_action_counts(&self) -> BTreeMap<SignalAction, usize> {
        let mut counts: BTreeMap<SignalAction, usize> = [
            SignalAction::Ignore,
            SignalAction::Info,
            SignalAction::Warn,
            SignalAction::Error,
        ]
        .into_iter()
        .map(|action| (action, 0))
        .collect();

        for resolved in &self.resolved_signals {
            *counts.entry(resolved.action).or_default() += 1;
        }
        counts
    }

    /// Machine-readable form, including an error/warning/signal summary.
    pub fn to_json_value(&self) -> serde_json::Value {
        let signal_actions: serde_json::Map<String, serde_json::Value> = self
            .signal_action_counts()
            .into_iter()
            .map(|(action, count)| (action.to_string(), serde_json::Value::from(count)))
            .collect();

        serde_json::json!({
            "ok": self.ok,
            "strict": self.strict,
            "issues": self.issues,
            "resolved_signals": self.resolved_signals,
            "summary": {
                "errors": self.errors().len(),
                "warnings": self.warnings().len(),
                "signal_actions": signal_actions,
            },
        })
    }
}

impl SignalsPolicy {
    /// Action for one signal: ignore list, then explicit override, then default.
    pub fn action_for(&self, signal_id: &str) -> (SignalAction, ActionSource) {
        if self.ignores(signal_id) {
            return (SignalAction::Ignore, ActionSource::Ignore);
        }
        if let Some(action) = self.override_for(signal_id) {
            return (action, ActionSource::Override);
        }
        (self.default_action, ActionSource::Default)
    }
}

/// Pair each signal with its policy action, keeping input order.
pub fn resolve_signal_actions(signals: &[Signal], policy: &SignalsPolicy) -> Vec<ResolvedSignal> {
    signals
        .iter()
        .map(|signal| {
            let (action, action_source) = policy.action_for(&signal.id);
            ResolvedSignal {
                signal: signal.clone(),
                action,
                action_source,
            }
        })
        .collect()
}

fn signal_issues(resolved: &[ResolvedSignal]) -> Vec<ValidationIssue> {
    resolved
        .iter()
        .filter_map(|rs| {
            let (severity, fallback) = match rs.action {
                SignalAction::Warn => (Severity::Warning, SIGNAL_WARN_FALLBACK),
                SignalAction::Error => (Severity::Error, SIGNAL_ERROR_FALLBACK),
                SignalAction::Ignore | SignalAction::Info => return None,
            };

            let suggestion = rs
                .signal
                .review_question
                .clone()
                .unwrap_or_else(|| fallback.to_string());

            Some(
                ValidationIssue::new(
                    format!("signal:{}", rs.signal.id),
                    severity,
                    format!("{} ({})", rs.signal.summary, rs.signal.id),
                )
                .with_suggestion(suggestion),
            )
        })
        .collect()
}

fn structural_issues(
    profile: &ResolvedProfile,
    report: &CapabilityReport,
    strict: bool,
) -> Vec<ValidationIssue> {
    let rules = &profile.rules;
    let severity = Severity::for_structural(strict);
    let mut issues = Vec::new();

    if !report.framework.mapping_declared {
        let min_domains = rules.min_domains().unwrap_or(0);
        if min_domains > 0 {
            issues.push(
                ValidationIssue::new(
                    "require_coverage",
                    severity,
                    "No capability_mapping present, but the profile requires declared domains.",
                )
                .with_suggestion("Add capability_mapping to the course specification."),
            );
        }
        return issues;
    }

    let declared = report.framework.domains_declared as u64;
    let min_domains = rules.min_domains().unwrap_or(1);
    if declared < min_domains {
        issues.push(
            ValidationIssue::new(
                "require_coverage",
                severity,
                format!(
                    "Only {} domains declared; minimum required is {}.",
                    declared, min_domains
                ),
            )
            .with_suggestion(
                "Declare additional domains in capability_mapping.domains, or lower min_domains in the profile.",
            ),
        );
    }

    let min_evidence = rules.min_evidence_per_domain().unwrap_or(0);
    if min_evidence > 0 {
        for (key, domain) in &report.domains {
            let count = domain.evidence_count as u64;
            if count < min_evidence {
                issues.push(
                    ValidationIssue::new(
                        "require_evidence",
                        severity,
                        format!(
                            "Evidence items declared: {}; minimum required: {}.",
                            count, min_evidence
                        ),
                    )
                    .with_domain(key)
                    .with_suggestion(
                        "Add evidence references for this domain, or lower the threshold in the profile.",
                    ),
                );
            }
        }
    }

    let min_coverage = rules.min_coverage_items_per_domain.unwrap_or(0);
    if min_coverage > 0 {
        for (key, domain) in &report.domains {
            let count = domain.coverage_count as u64;
            if count < min_coverage {
                issues.push(
                    ValidationIssue::new(
                        "min_coverage_items_per_domain",
                        severity,
                        format!(
                            "Coverage items declared: {}; minimum required: {}.",
                            count, min_coverage
                        ),
                    )
                    .with_domain(key)
                    .with_suggestion(
                        "Add coverage references for this domain, or lower the threshold in the profile.",
                    ),
                );
            }
        }
    }

    if rules.forbid_empty_domains.unwrap_or(false) {
        for (key, domain) in report.domains.iter().filter(|(_, d)| d.gap) {
            issues.push(
                ValidationIssue::new(
                    "forbid_empty_domains",
                    severity,
                    "Domain is declared but has no coverage and no evidence (gap).",
                )
                .with_domain(key)
                .with_suggestion(
                    "Either add coverage/evidence for this domain, or remove it from the mapping.",
                ),
            );
        }
    }

    issues
}

/// Evaluate a resolved profile against a coverage report and computed signals.
pub fn evaluate(
    profile: &ResolvedProfile,
    report: &CapabilityReport,
    signals: &[Signal],
    strict: bool,
) -> Result<ValidationResult, EvaluationError> {
    report.check_shape()?;

    let resolved_signals = resolve_signal_actions(signals, &profile.signals);

    let mut issues = signal_issues(&resolved_signals);
    issues.extend(structural_issues(profile, report, strict));
    issues.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let ok = issues.iter().all(|i| i.severity != Severity::Error);

    Ok(ValidationResult {
        ok,
        strict,
        issues,
        resolved_signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{RequireCoverage, RequireEvidence, Rules};
    use crate::report::{build_capability_report, CourseIdentity, DomainEntry, GapSummary};
    use crate::signals::SignalSeverity;

    fn profile(rules: Rules, signals: SignalsPolicy) -> ResolvedProfile {
        ResolvedProfile {
            rules,
            signals,
            ..ResolvedProfile::unconstrained("baseline")
        }
    }

    fn report(domains: &[(&str, usize, usize)]) -> CapabilityReport {
        let mut report = build_capability_report(&CourseIdentity::new("c1", "Course", "1.0"), None);
        report.framework.mapping_declared = true;
        for (key, coverage, evidence) in domains {
            let entry = DomainEntry::new(
                None,
                (0..*coverage).map(|i| format!("c{}", i)).collect(),
                (0..*evidence).map(|i| format!("e{}", i)).collect(),
            );
            report.domains.insert(key.to_string(), entry);
        }
        let gap_domains: Vec<String> = report
            .domains
            .iter()
            .filter(|(_, d)| d.gap)
            .map(|(k, _)| k.clone())
            .collect();
        report.summary = GapSummary {
            gaps: gap_domains.len(),
            gap_domains,
        };
        report.framework.domains_declared = report.domains.len();
        report
    }

    fn signal(id: &str) -> Signal {
        Signal {
            id: id.to_string(),
            severity: SignalSeverity::Warning,
            summary: format!("{} summary", id),
            detail: String::new(),
            evidence: vec![],
            review_question: None,
            source: None,
            tags: vec![],
        }
    }

    fn min_domains(n: u64) -> Rules {
        Rules {
            require_coverage: Some(RequireCoverage { min_domains: Some(n) }),
            ..Rules::default()
        }
    }

    #[test]
    fn test_ignore_beats_override_beats_default() {
        let policy = SignalsPolicy {
            default_action: SignalAction::Info,
            overrides: [("SIG-X".to_string(), SignalAction::Warn)].into_iter().collect(),
            ignore: vec!["SIG-X".to_string()],
        };
        assert_eq!(
            policy.action_for("SIG-X"),
            (SignalAction::Ignore, ActionSource::Ignore)
        );

        let policy = SignalsPolicy {
            ignore: vec![],
            ..policy
        };
        assert_eq!(
            policy.action_for("SIG-X"),
            (SignalAction::Warn, ActionSource::Override)
        );
        assert_eq!(
            policy.action_for("SIG-Y"),
            (SignalAction::Info, ActionSource::Default)
        );
    }

    #[test]
    fn test_min_domains_warning_in_non_strict_mode() {
        let result = evaluate(
            &profile(min_domains(4), SignalsPolicy::default()),
            &report(&[("a", 1, 1), ("b", 1, 1), ("c", 1, 1)]),
            &[],
            false,
        )
        .unwrap();

        assert!(result.ok);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.rule, "require_coverage");
        assert_eq!(issue.severity, Severity::Warning);
        assert!(issue
            .message
            .contains("Only 3 domains declared; minimum required is 4"));
    }

    #[test]
    fn test_min_domains_error_in_strict_mode() {
        let result = evaluate(
            &profile(min_domains(4), SignalsPolicy::default()),
            &report(&[("a", 1, 1), ("b", 1, 1), ("c", 1, 1)]),
            &[],
            true,
        )
        .unwrap();

        assert!(!result.ok);
        assert_eq!(result.issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_signal_error_fails_without_strict() {
        let signals = SignalsPolicy {
            overrides: [("SIG-MAP-001".to_string(), SignalAction::Error)]
                .into_iter()
                .collect(),
            ..SignalsPolicy::default()
        };
        let result = evaluate(
            &profile(Rules::default(), signals),
            &report(&[("a", 1, 1)]),
            &[signal("SIG-MAP-001")],
            false,
        )
        .unwrap();

        assert!(!result.ok);
        assert_eq!(result.signal_errors().len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.rule, "signal:SIG-MAP-001");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.message, "SIG-MAP-001 summary (SIG-MAP-001)");
        assert_eq!(issue.suggested_action.as_deref(), Some(SIGNAL_ERROR_FALLBACK));
    }

    #[test]
    fn test_info_and_ignored_signals_never_become_issues() {
        let signals = SignalsPolicy {
            ignore: vec!["SIG-B".to_string()],
            ..SignalsPolicy::default()
        };
        let result = evaluate(
            &profile(Rules::default(), signals),
            &report(&[("a", 1, 1)]),
            &[signal("SIG-A"), signal("SIG-B")],
            true,
        )
        .unwrap();

        assert!(result.ok);
        assert!(result.issues.is_empty());
        let counts = result.signal_action_counts();
        assert_eq!(counts[&SignalAction::Info], 1);
        assert_eq!(counts[&SignalAction::Ignore], 1);
        assert_eq!(counts[&SignalAction::Error], 0);
    }

    #[test]
    fn test_per_domain_rules_and_sorting() {
        let rules = Rules {
            require_coverage: Some(RequireCoverage { min_domains: Some(1) }),
            require_evidence: Some(RequireEvidence {
                min_items_per_domain: Some(1),
            }),
            min_coverage_items_per_domain: Some(2),
            forbid_empty_domains: Some(true),
        };
        let signals = SignalsPolicy {
            default_action: SignalAction::Warn,
            ..SignalsPolicy::default()
        };
        let result = evaluate(
            &profile(rules, signals),
            &report(&[("zeta", 0, 0), ("alpha", 2, 0)]),
            &[signal("SIG-A")],
            false,
        )
        .unwrap();

        let keys: Vec<(&str, Option<&str>)> = result
            .issues
            .iter()
            .map(|i| (i.rule.as_str(), i.domain.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("forbid_empty_domains", Some("zeta")),
                ("min_coverage_items_per_domain", Some("zeta")),
                ("require_evidence", Some("alpha")),
                ("require_evidence", Some("zeta")),
                ("signal:SIG-A", None),
            ]
        );
        assert!(result.ok);
    }

    #[test]
    fn test_strict_errors_sort_before_signal_warnings() {
        let signals = SignalsPolicy {
            default_action: SignalAction::Warn,
            ..SignalsPolicy::default()
        };
        let result = evaluate(
            &profile(min_domains(2), signals),
            &report(&[("a", 1, 1)]),
            &[signal("SIG-A")],
            true,
        )
        .unwrap();

        assert_eq!(result.issues[0].severity, Severity::Error);
        assert_eq!(result.issues[1].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_mapping_only_checks_min_domains() {
        let rules = Rules {
            forbid_empty_domains: Some(true),
            ..min_domains(1)
        };
        let no_mapping = build_capability_report(&CourseIdentity::default(), None);

        let result = evaluate(&profile(rules.clone(), SignalsPolicy::default()), &no_mapping, &[], false).unwrap();
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].message.contains("No capability_mapping present"));

        let relaxed = Rules {
            require_coverage: Some(RequireCoverage { min_domains: Some(0) }),
            ..rules
        };
        let result = evaluate(&profile(relaxed, SignalsPolicy::default()), &no_mapping, &[], true).unwrap();
        assert!(result.issues.is_empty());
        assert!(result.ok);
    }

    #[test]
    fn test_unset_min_domains_defaults_to_one_with_mapping() {
        let result = evaluate(
            &profile(Rules::default(), SignalsPolicy::default()),
            &report(&[]),
            &[],
            false,
        )
        .unwrap();
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].message.contains("Only 0 domains declared"));
    }

    #[test]
    fn test_malformed_report_fails_fast() {
        let mut bad = report(&[("a", 1, 0)]);
        bad.domains.get_mut("a").unwrap().gap = true;

        let err = evaluate(
            &profile(Rules::default(), SignalsPolicy::default()),
            &bad,
            &[],
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Malformed capability report"));
    }

    #[test]
    fn test_json_value_includes_summary() {
        let result = evaluate(
            &profile(min_domains(2), SignalsPolicy::default()),
            &report(&[("a", 1, 1)]),
            &[signal("SIG-A")],
            false,
        )
        .unwrap();

        let value = result.to_json_value();
        assert_eq!(value["ok"], true);
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["summary"]["signal_actions"]["info"], 1);
        assert_eq!(value["resolved_signals"][0]["id"], "SIG-A");
        assert_eq!(value["resolved_signals"][0]["action_source"], "default");
    }
}
