//! Absence signals: policy-independent facts about governance metadata.
//!
//! Signals are computed from a course specification and never authored by a
//! policy. Whether a signal is ignored, reported, or gates validation is
//! decided later by the resolved signal policy.
//!
//! Adding a signal means adding a rule to [`SIGNAL_RULES`]; existing rules
//! are never changed in place.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::course::CourseSpec;

/// Severity carried by a signal itself, before any policy interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSeverity {
    Info,
    Warning,
}

impl fmt::Display for SignalSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSeverity::Info => write!(f, "info"),
            SignalSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A computed governance fact. Optional fields serialize as explicit nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub severity: SignalSeverity,
    pub summary: String,
    pub detail: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub review_question: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The presence/absence facts signal rules look at.
///
/// Callers with their own course parser can fill this in directly;
/// [`GovernanceFacts::from_course`] derives it from a [`CourseSpec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GovernanceFacts {
    pub design_intent_declared: bool,
    pub framework_alignment_declared: bool,
    /// Number of mapped domains, or `None` when no capability mapping exists.
    pub capability_mapping_domains: Option<usize>,
    pub ai_position_declared: bool,
    pub ai_scoping_declared: bool,
}

impl GovernanceFacts {
    pub fn from_course(course: &CourseSpec) -> Self {
        Self {
            design_intent_declared: course.design_intent.is_some(),
            framework_alignment_declared: course.framework_alignment.is_some(),
            capability_mapping_domains: course
                .capability_mapping
                .as_ref()
                .map(|mapping| mapping.domains.len()),
            ai_position_declared: course.has_ai_position(),
            ai_scoping_declared: course.has_ai_scoping(),
        }
    }
}

type SignalRule = fn(&GovernanceFacts) -> Option<Signal>;

/// Every signal rule, in no particular order; output is sorted by id.
pub const SIGNAL_RULES: &[SignalRule] = &[
    design_intent_missing,
    alignment_without_mapping,
    thin_mapping,
    ai_position_without_scoping,
];

const COURSE_FILE: &str = "course.yml";

/// Compute signals for a set of facts, sorted by signal id.
pub fn compute_signals(facts: &GovernanceFacts) -> Vec<Signal> {
    let mut signals: Vec<Signal> = SIGNAL_RULES.iter().filter_map(|rule| rule(facts)).collect();
    signals.sort_by(|a, b| a.id.cmp(&b.id));
    signals
}

/// Compute signals for a parsed course specification.
pub fn compute_course_signals(course: &CourseSpec) -> Vec<Signal> {
    compute_signals(&GovernanceFacts::from_course(course))
}

fn signal(
    id: &str,
    severity: SignalSeverity,
    summary: &str,
    detail: &str,
    evidence: &[&str],
    review_question: &str,
    tags: &[&str],
) -> Signal {
    Signal {
        id: id.to_string(),
        severity,
        summary: summary.to_string(),
        detail: detail.to_string(),
        evidence: evidence.iter().map(|s| s.to_string()).collect(),
        review_question: Some(review_question.to_string()),
        source: Some(COURSE_FILE.to_string()),
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

// SIG-INTENT-001
fn design_intent_missing(facts: &GovernanceFacts) -> Option<Signal> {
    if facts.design_intent_declared {
        return None;
    }

    Some(signal(
        "SIG-INTENT-001",
        SignalSeverity::Info,
        "Design intent not declared",
        "The course does not declare a design_intent section. Design intent is optional, \
         but its absence may reduce traceability in review contexts.",
        &["course.yml:design_intent"],
        "Is design intent documented elsewhere, and should it be recorded here for auditability?",
        &["intent"],
    ))
}

// SIG-MAP-001
fn alignment_without_mapping(facts: &GovernanceFacts) -> Option<Signal> {
    if !facts.framework_alignment_declared || facts.capability_mapping_domains.is_some() {
        return None;
    }

    Some(signal(
        "SIG-MAP-001",
        SignalSeverity::Warning,
        "Framework alignment declared without capability mapping",
        "The course declares framework alignment but provides no inspectable capability_mapping. \
         The alignment claim cannot be traced to evidence.",
        &["course.yml:framework_alignment", "course.yml:capability_mapping"],
        "Is the alignment claim sufficiently evidenced for internal or external review?",
        &["mapping", "claims"],
    ))
}

// SIG-MAP-002: only fires when a mapping exists, so never alongside SIG-MAP-001
fn thin_mapping(facts: &GovernanceFacts) -> Option<Signal> {
    if facts.capability_mapping_domains != Some(0) {
        return None;
    }

    Some(signal(
        "SIG-MAP-002",
        SignalSeverity::Warning,
        "Capability mapping present but appears thin",
        "The course includes a capability_mapping object, but its domain map is empty. \
         A thin mapping can look like evidence without offering inspectable detail.",
        &["course.yml:capability_mapping"],
        "Does the mapping contain enough inspectable detail to support the stated alignment claim?",
        &["mapping"],
    ))
}

// SIG-AI-001
fn ai_position_without_scoping(facts: &GovernanceFacts) -> Option<Signal> {
    if !facts.ai_position_declared || facts.ai_scoping_declared {
        return None;
    }

    Some(signal(
        "SIG-AI-001",
        SignalSeverity::Info,
        "AI positioning declared without structural scoping metadata",
        "Design intent includes AI positioning (design_intent.ai_position), but there is no \
         separate, structured ai_scoping block in the course specification.",
        &["course.yml:design_intent.ai_position"],
        "Are the scope and boundaries of AI use clearly recorded for review and assurance?",
        &["ai", "intent"],
    ))
}
