//! Course specification model.
//!
//! Only the governance-relevant parts of a course file are modelled here:
//! identity, declared framework alignment, the capability mapping, design
//! intent and AI scoping. Content sections (modules, lessons, outputs) are
//! ignored.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::CourseError;

/// Pattern every course id must match.
pub const COURSE_ID_PATTERN: &str = r"^[a-z0-9][a-z0-9\-]*$";

/// Status recorded for a mapping that does not declare one.
pub const DEFAULT_MAPPING_STATUS: &str = "informational (not enforced)";

/// `course:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMeta {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Declared (not evidenced) alignment to an external framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkAlignment {
    pub framework_name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Coverage and evidence declared for one capability domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub coverage: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub evidence: Vec<String>,
}

/// Capability mapping metadata. Informational; never enforced on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Externally-authored domain count, trusted verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains_declared: Option<usize>,
    #[serde(default, deserialize_with = "domain_map")]
    pub domains: BTreeMap<String, DomainMapping>,
}

/// Descriptive AI positioning inside design intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_activities: Option<String>,
}

/// `design_intent:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_position: Option<AiPosition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub roles_and_responsibilities: BTreeMap<String, String>,
    /// Remaining descriptive fields (framework references, review cycle...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A parsed course specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSpec {
    pub course: CourseMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework_alignment: Option<FrameworkAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_mapping: Option<CapabilityMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_intent: Option<DesignIntent>,
    /// Structured AI scoping, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_scoping: Option<serde_yaml::Value>,
}

impl CourseSpec {
    /// Parse a YAML course file and check its identity fields.
    pub fn parse(content: &str) -> Result<Self, CourseError> {
        let spec: CourseSpec =
            serde_yaml::from_str(content).map_err(|e| CourseError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check identity and alignment fields.
    pub fn validate(&self) -> Result<(), CourseError> {
        let id_pattern = Regex::new(COURSE_ID_PATTERN).map_err(|e| CourseError::Invalid {
            field: "course.id".to_string(),
            message: e.to_string(),
        })?;

        if !id_pattern.is_match(&self.course.id) {
            return Err(CourseError::Invalid {
                field: "course.id".to_string(),
                message: format!(
                    "'{}' must be lowercase letters, digits and hyphens",
                    self.course.id
                ),
            });
        }

        if self.course.title.trim().is_empty() {
            return Err(CourseError::Invalid {
                field: "course.title".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.course.version.trim().is_empty() {
            return Err(CourseError::Invalid {
                field: "course.version".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if let Some(alignment) = &self.framework_alignment {
            if alignment.framework_name.trim().is_empty() {
                return Err(CourseError::Invalid {
                    field: "framework_alignment.framework_name".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn has_ai_position(&self) -> bool {
        self.design_intent
            .as_ref()
            .is_some_and(|intent| intent.ai_position.is_some())
    }

    /// An `ai_scoping` block that is present and not null.
    pub fn has_ai_scoping(&self) -> bool {
        self.ai_scoping
            .as_ref()
            .is_some_and(|scoping| !scoping.is_null())
    }
}

/// Accept a list, a single scalar, or null.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar(item).ok_or_else(|| D::Error::custom("expected a list of strings")))
            .collect(),
        Some(other) => scalar(&other)
            .map(|s| vec![s])
            .ok_or_else(|| D::Error::custom("expected a string or a list of strings")),
    }
}

/// Domain entries may be left empty (`key:`), which means "declared, nothing mapped".
fn domain_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, DomainMapping>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<DomainMapping>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, mapping)| (key, mapping.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURSE: &str = r#"
course:
  id: ai-literacy
  title: AI Literacy for Practitioners
  version: 0.3.0
framework_alignment:
  framework_name: Example Capability Framework
  domains: [awareness, ethics]
capability_mapping:
  framework: Example Capability Framework
  version: "2026"
  domains:
    awareness:
      label: Awareness
      coverage: [module-1]
      evidence: lesson:intro
    ethics:
design_intent:
  summary: Build confident, critical use.
  ai_position:
    assessments: AI use must be declared.
structure:
  modules: []
"#;

    #[test]
    fn test_parse_course_with_mapping() {
        let spec = CourseSpec::parse(COURSE).unwrap();
        assert_eq!(spec.course.id, "ai-literacy");

        let mapping = spec.capability_mapping.as_ref().unwrap();
        assert_eq!(mapping.domains.len(), 2);
        let awareness = &mapping.domains["awareness"];
        assert_eq!(awareness.coverage, vec!["module-1"]);
        // Scalar evidence becomes a one-item list
        assert_eq!(awareness.evidence, vec!["lesson:intro"]);
        // Empty entry is declared but unmapped
        assert_eq!(mapping.domains["ethics"], DomainMapping::default());

        assert!(spec.has_ai_position());
        assert!(!spec.has_ai_scoping());
    }

    #[test]
    fn test_invalid_course_id_rejected() {
        let content = COURSE.replace("id: ai-literacy", "id: AI Literacy");
        let err = CourseSpec::parse(&content).unwrap_err();
        assert!(err.to_string().contains("course.id"));
    }

    #[test]
    fn test_missing_course_section_is_parse_error() {
        let err = CourseSpec::parse("framework_alignment:\n  framework_name: X\n").unwrap_err();
        assert!(matches!(err, CourseError::Parse(_)));
    }

    #[test]
    fn test_blank_framework_name_rejected() {
        let content = COURSE.replace(
            "framework_name: Example Capability Framework\n  domains",
            "framework_name: \"  \"\n  domains",
        );
        let err = CourseSpec::parse(&content).unwrap_err();
        assert!(err.to_string().contains("framework_alignment.framework_name"));
    }
}
