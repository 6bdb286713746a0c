//! Human-readable renderings of reports, verdicts, explanations and signals.
//!
//! JSON renderings live next to the types (`serde`); this module only
//! produces text for terminals and review documents.

use colored::Colorize;

use crate::course::FrameworkAlignment;
use crate::policy::{PolicyExplanation, SignalAction};
use crate::report::CapabilityReport;
use crate::signals::{Signal, SignalSeverity};
use crate::validation::{Severity, ValidationResult};

const PLACEHOLDER: &str = "—";

/// Format a capability report as a table with a gap summary.
pub fn format_report(report: &CapabilityReport, verbose: bool) -> String {
    let course = &report.course;
    let framework = &report.framework;

    let mut output = vec![
        "Capability Coverage Report".bold().to_string(),
        format!(
            "Course: {} ({}) v{}",
            or_placeholder(course.title.as_deref()),
            or_placeholder(course.id.as_deref()),
            or_placeholder(course.version.as_deref()),
        ),
        format!(
            "Framework: {} ({})",
            or_placeholder(framework.name.as_deref()),
            or_placeholder(framework.version.as_deref()),
        ),
        format!("Status: {}", framework.status),
        String::new(),
        "Domains".bold().to_string(),
        format!("- Declared: {}", framework.domains_declared),
        String::new(),
    ];

    let rows: Vec<Vec<String>> = report
        .domains
        .iter()
        .map(|(key, domain)| {
            vec![
                key.clone(),
                domain.label.clone().unwrap_or_default(),
                domain.coverage_count.to_string(),
                domain.evidence_count.to_string(),
                if domain.gap { "GAP" } else { "OK" }.to_string(),
            ]
        })
        .collect();

    output.push(format_table(
        &["Domain key", "Label", "Coverage items", "Evidence items", "Notes"],
        &rows,
    ));
    output.push(String::new());
    output.push("Summary".bold().to_string());

    let gaps = format!("- Domains with gaps: {}", report.summary.gaps);
    output.push(if report.has_gaps() {
        gaps.yellow().to_string()
    } else {
        gaps
    });

    if verbose {
        output.push(String::new());
        output.push("Details (verbose)".bold().to_string());
        for (key, domain) in &report.domains {
            output.push(key.cyan().to_string());
            output.push(format!("  coverage: {}", format_list(&domain.coverage)));
            output.push(format!("  evidence: {}", format_list(&domain.evidence)));
        }
    } else {
        output.push(
            "- Tip: run with --verbose to see declared coverage/evidence lists."
                .dimmed()
                .to_string(),
        );
    }

    output.join("\n")
}

/// Format a declared framework alignment for courses with no mapping.
pub fn format_alignment_only(alignment: &FrameworkAlignment) -> String {
    let mut output = vec![
        "Declared framework alignment (no capability mapping coverage data):".to_string(),
        format!("  Framework: {}", alignment.framework_name),
    ];

    if alignment.domains.is_empty() {
        output.push(format!("  Domains: {}", PLACEHOLDER));
    } else {
        output.push(format!("  Domains: {}", alignment.domains.join(", ")));
    }
    if let Some(mode) = &alignment.mapping_mode {
        output.push(format!("  Mapping mode: {}", mode));
    }
    if let Some(notes) = alignment.notes.as_deref().filter(|n| !n.is_empty()) {
        output.push(format!("  Notes: {}", notes));
    }

    output.join("\n")
}

/// Format a validation verdict with its issues.
pub fn format_validation(result: &ValidationResult) -> String {
    let headline = match (result.ok, result.strict) {
        (true, true) => "✔ Capability mapping validation passed".green(),
        (true, false) => "✔ Capability mapping validation completed (non-strict)".green(),
        (false, _) => "✖ Capability mapping validation failed".red(),
    };

    let mut output = vec![
        headline.bold().to_string(),
        format!(
            "Mode: {}",
            if result.strict { "STRICT" } else { "Non-strict" }
        ),
        format!(
            "Summary: {} error(s) | {} warning(s)",
            result.errors().len(),
            result.warnings().len()
        ),
    ];

    if !result.resolved_signals.is_empty() {
        let counts = result.signal_action_counts();
        let count = |action: SignalAction| counts.get(&action).copied().unwrap_or(0);
        output.push(format!(
            "Signals: {} error | {} warn | {} info | {} ignored",
            count(SignalAction::Error),
            count(SignalAction::Warn),
            count(SignalAction::Info),
            count(SignalAction::Ignore),
        ));
    }

    output.push(String::new());

    if result.issues.is_empty() {
        output.push("No issues found.".to_string());
        return output.join("\n");
    }

    for issue in &result.issues {
        let tag = match issue.severity {
            Severity::Error => issue.severity.to_string().red(),
            Severity::Warning => issue.severity.to_string().yellow(),
        };
        let location = issue
            .domain
            .as_ref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        output.push(format!(
            "- {} [{}]{}: {}",
            tag, issue.rule, location, issue.message
        ));
        if let Some(suggestion) = &issue.suggested_action {
            output.push(format!("  Suggested action: {}", suggestion));
        }
    }

    output.join("\n")
}

/// Format a policy explanation.
pub fn format_explanation(explanation: &PolicyExplanation) -> String {
    let policy = &explanation.policy;
    let rules = &explanation.rules;
    let signals = &explanation.signals;

    let mut output = vec![format!("Policy: {}", policy.source)];
    if let Some(name) = &policy.policy_name {
        output.push(format!("  Name: {}", name));
    }
    if let Some(id) = &policy.policy_id {
        output.push(format!("  Id: {}", id));
    }
    if let Some(owner) = &policy.owner {
        output.push(format!("  Owner: {}", owner));
    }
    if let Some(updated) = &policy.last_updated {
        output.push(format!("  Last updated: {}", updated));
    }

    output.push(format!("Profile: {}", explanation.profile.name.cyan()));
    if let Some(description) = &explanation.profile.description {
        output.push(format!("  {}", description.dimmed()));
    }
    output.push(format!(
        "Strict: {}",
        if explanation.strict { "ON" } else { "OFF" }
    ));
    output.push(format!(
        "Chain: {}",
        if explanation.chain.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            explanation.chain.join(" -> ")
        }
    ));

    output.push("Resolved rules:".bold().to_string());
    if rules.is_empty() {
        output.push("  (none)".dimmed().to_string());
    }
    if let Some(n) = rules.min_domains() {
        output.push(format!("  require_coverage.min_domains: {}", n));
    }
    if let Some(n) = rules.min_evidence_per_domain() {
        output.push(format!("  require_evidence.min_items_per_domain: {}", n));
    }
    if let Some(n) = rules.min_coverage_items_per_domain {
        output.push(format!("  min_coverage_items_per_domain: {}", n));
    }
    if let Some(flag) = rules.forbid_empty_domains {
        output.push(format!("  forbid_empty_domains: {}", flag));
    }

    output.push("Resolved signals:".bold().to_string());
    output.push(format!("  default_action: {}", signals.default_action));
    if signals.overrides.is_empty() {
        output.push(format!("  overrides: {}", PLACEHOLDER));
    } else {
        output.push("  overrides:".to_string());
        for (signal_id, action) in &signals.overrides {
            output.push(format!("    {}: {}", signal_id, action));
        }
    }
    output.push(format!(
        "  ignore: {}",
        if signals.ignore.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            signals.ignore.join(", ")
        }
    ));

    output.join("\n")
}

/// Format computed signals, one block per signal.
pub fn format_signals(signals: &[Signal]) -> String {
    if signals.is_empty() {
        return "No signals.".to_string();
    }

    let mut output = vec![format!("Signals ({})", signals.len()).bold().to_string()];
    for signal in signals {
        let severity = match signal.severity {
            SignalSeverity::Info => signal.severity.to_string().blue(),
            SignalSeverity::Warning => signal.severity.to_string().yellow(),
        };
        output.push(String::new());
        output.push(format!(
            "{} [{}] {}",
            signal.id.cyan(),
            severity,
            signal.summary
        ));
        output.push(format!("  {}", signal.detail));
        if !signal.evidence.is_empty() {
            output.push(format!("  Evidence: {}", signal.evidence.join(", ")));
        }
        if let Some(question) = &signal.review_question {
            output.push(format!("  Review question: {}", question));
        }
    }

    output.join("\n")
}

fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER)
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "[]".to_string()
    } else {
        format!("[{}]", items.join(", "))
    }
}

/// Render a markdown-style table sized to its widest cells.
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = vec![
        format_row(headers, &widths),
        format!("|-{}-|", separator.join("-|-")),
    ];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    format!("| {} |", padded.join(" | "))
}
