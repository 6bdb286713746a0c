//! Capability coverage report built from declared mapping data.
//!
//! The report is a pure summary: counts per domain, a gap flag, and the list
//! of gap domains. Domains are keyed in a `BTreeMap`, so both the map and
//! `gap_domains` come out in lexical key order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::course::{CapabilityMapping, CourseSpec, DEFAULT_MAPPING_STATUS};
use crate::error::EvaluationError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseIdentity {
    pub id: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
}

impl CourseIdentity {
    pub fn new(id: &str, title: &str, version: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            version: Some(version.to_string()),
        }
    }
}

/// Framework section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    pub status: String,
    pub domains_declared: usize,
    /// False when the course declared no capability mapping at all.
    #[serde(default = "default_true")]
    pub mapping_declared: bool,
}

/// Per-domain coverage and evidence counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub label: Option<String>,
    pub coverage_count: usize,
    pub evidence_count: usize,
    pub gap: bool,
    pub coverage: Vec<String>,
    pub evidence: Vec<String>,
}

impl DomainEntry {
    pub fn new(label: Option<String>, coverage: Vec<String>, evidence: Vec<String>) -> Self {
        Self {
            label,
            coverage_count: coverage.len(),
            evidence_count: evidence.len(),
            gap: coverage.is_empty() && evidence.is_empty(),
            coverage,
            evidence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSummary {
    pub gaps: usize,
    pub gap_domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub course: CourseIdentity,
    #[serde(alias = "capability_mapping")]
    pub framework: FrameworkSummary,
    pub domains: BTreeMap<String, DomainEntry>,
    pub summary: GapSummary,
}

/// Build a coverage report.
///
/// A missing mapping yields an empty report with `mapping_declared == false`.
/// `domains_declared` is the number of domain entries unless the mapping
/// carries its own count, which is used as-is.
pub fn build_capability_report(
    course: &CourseIdentity,
    mapping: Option<&CapabilityMapping>,
) -> CapabilityReport {
    let Some(mapping) = mapping else {
        return CapabilityReport {
            course: course.clone(),
            framework: FrameworkSummary {
                name: None,
                version: None,
                status: DEFAULT_MAPPING_STATUS.to_string(),
                domains_declared: 0,
                mapping_declared: false,
            },
            domains: BTreeMap::new(),
            summary: GapSummary::default(),
        };
    };

    let domains: BTreeMap<String, DomainEntry> = mapping
        .domains
        .iter()
        .map(|(key, domain)| {
            let label = domain.label.clone().filter(|l| !l.is_empty());
            let entry = DomainEntry::new(label, domain.coverage.clone(), domain.evidence.clone());
            (key.clone(), entry)
        })
        .collect();

    let gap_domains: Vec<String> = domains
        .iter()
        .filter(|(_, entry)| entry.gap)
        .map(|(key, _)| key.clone())
        .collect();

    CapabilityReport {
        course: course.clone(),
        framework: FrameworkSummary {
            name: mapping.framework.clone(),
            version: mapping.version.clone(),
            status: mapping
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_MAPPING_STATUS.to_string()),
            domains_declared: mapping.domains_declared.unwrap_or(domains.len()),
            mapping_declared: true,
        },
        domains,
        summary: GapSummary {
            gaps: gap_domains.len(),
            gap_domains,
        },
    }
}

impl CapabilityReport {
    pub fn from_course(course: &CourseSpec) -> Self {
        let identity = CourseIdentity::new(
            &course.course.id,
            &course.course.title,
            &course.course.version,
        );
        build_capability_report(&identity, course.capability_mapping.as_ref())
    }

    /// Parse a report persisted as JSON and check its shape.
    pub fn from_json(content: &str) -> Result<Self, EvaluationError> {
        let report: CapabilityReport =
            serde_json::from_str(content).map_err(|e| EvaluationError::Parse(e.to_string()))?;
        report.check_shape()?;
        Ok(report)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Check that counts, gap flags and the gap summary agree with the lists.
    pub fn check_shape(&self) -> Result<(), EvaluationError> {
        for (key, entry) in &self.domains {
            if entry.coverage_count != entry.coverage.len() {
                return Err(EvaluationError::MalformedReport(format!(
                    "domain '{}' has coverage_count {} but {} coverage items",
                    key,
                    entry.coverage_count,
                    entry.coverage.len()
                )));
            }
            if entry.evidence_count != entry.evidence.len() {
                return Err(EvaluationError::MalformedReport(format!(
                    "domain '{}' has evidence_count {} but {} evidence items",
                    key,
                    entry.evidence_count,
                    entry.evidence.len()
                )));
            }
            let gap = entry.coverage_count == 0 && entry.evidence_count == 0;
            if entry.gap != gap {
                return Err(EvaluationError::MalformedReport(format!(
                    "domain '{}' has gap={} but coverage/evidence counts imply gap={}",
                    key, entry.gap, gap
                )));
            }
        }

        let gap_domains: Vec<&String> = self
            .domains
            .iter()
            .filter(|(_, entry)| entry.gap)
            .map(|(key, _)| key)
            .collect();

        if self.summary.gaps != gap_domains.len()
            || self.summary.gap_domains.iter().ne(gap_domains.iter().copied())
        {
            return Err(EvaluationError::MalformedReport(
                "summary.gaps/gap_domains do not match the per-domain gap flags".to_string(),
            ));
        }

        if !self.framework.mapping_declared && !self.domains.is_empty() {
            return Err(EvaluationError::MalformedReport(
                "domains listed but mapping_declared is false".to_string(),
            ));
        }

        Ok(())
    }

    pub fn has_gaps(&self) -> bool {
        self.summary.gaps > 0
    }
}

fn default_true() -> bool {
    true
}
