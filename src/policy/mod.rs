//! Policy documents: loading, schema checks, presets and profile resolution.
//!
//! A policy is a versioned document holding named profiles. Each profile
//! carries structural rules and, optionally, a signal-interpretation block.
//! Profiles may extend one another; [`resolve_profile`] flattens an
//! inheritance chain into a single [`ResolvedProfile`].
//!
//! Loading is fail-closed: the first schema violation aborts the load and no
//! partially-validated policy is ever returned.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{PolicyError, PolicyResult};

pub mod explain;
pub mod presets;
pub mod resolve;
pub mod schema;

pub use explain::PolicyExplanation;
pub use presets::{list_presets, load_preset, DEFAULT_PRESET};
pub use resolve::{resolve_profile, ResolvedProfile, FALLBACK_PROFILE, MAX_INHERITANCE_DEPTH};

/// The only policy document version this engine understands.
pub const POLICY_VERSION: u64 = 1;

/// Prefix selecting a bundled preset in a policy source string.
pub const PRESET_PREFIX: &str = "preset:";

/// How a policy tells the engine to treat a computed signal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Ignore,
    #[default]
    Info,
    Warn,
    Error,
}

impl SignalAction {
    pub const ALLOWED: &'static str = "ignore|info|warn|error";

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ignore" => Some(SignalAction::Ignore),
            "info" => Some(SignalAction::Info),
            "warn" => Some(SignalAction::Warn),
            "error" => Some(SignalAction::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Ignore => "ignore",
            SignalAction::Info => "info",
            SignalAction::Warn => "warn",
            SignalAction::Error => "error",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `require_coverage` rule block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequireCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_domains: Option<u64>,
}

/// `require_evidence` rule block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequireEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items_per_domain: Option<u64>,
}

/// Structural rules declared by a profile.
///
/// Every field is optional so that a child profile only overrides what it
/// names. Unset thresholds are treated as "not enforced" at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_coverage: Option<RequireCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_evidence: Option<RequireEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_coverage_items_per_domain: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbid_empty_domains: Option<bool>,
}

impl Rules {
    /// Rule keys accepted at the top level of a `rules` mapping.
    pub const KEYS: [&'static str; 4] = [
        "require_coverage",
        "require_evidence",
        "min_coverage_items_per_domain",
        "forbid_empty_domains",
    ];

    pub fn min_domains(&self) -> Option<u64> {
        self.require_coverage.as_ref().and_then(|r| r.min_domains)
    }

    pub fn min_evidence_per_domain(&self) -> Option<u64> {
        self.require_evidence
            .as_ref()
            .and_then(|r| r.min_items_per_domain)
    }

    pub fn is_empty(&self) -> bool {
        self == &Rules::default()
    }
}

/// A `signals:` block exactly as authored in a policy or profile.
///
/// `default_action` stays optional here: during resolution a child only
/// replaces its parent's default when it sets one explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalsBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<SignalAction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overrides: BTreeMap<String, SignalAction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ignore: Vec<String>,
}

/// Fully-populated signal interpretation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalsPolicy {
    #[serde(default)]
    pub default_action: SignalAction,
    #[serde(default)]
    pub overrides: BTreeMap<String, SignalAction>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// A named profile inside a policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rules: Rules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalsBlock>,
}

impl Profile {
    /// Parent profile name, treating an empty `extends` as absent.
    pub fn parent(&self) -> Option<&str> {
        self.extends
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A validated policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(alias = "policy_version")]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalsBlock>,
    pub profiles: BTreeMap<String, Profile>,
    /// Free-form metadata (owner, notes, policy id...) carried through untouched.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Serialization of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Yaml,
    Json,
}

impl PolicyFormat {
    /// Pick the format from a file extension (`.yml`, `.yaml`, `.json`).
    pub fn from_path(path: &Path) -> PolicyResult<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "yml" | "yaml" => Ok(PolicyFormat::Yaml),
            "json" => Ok(PolicyFormat::Json),
            _ => Err(PolicyError::UnsupportedFormat {
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

impl fmt::Display for PolicyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyFormat::Yaml => write!(f, "yaml"),
            PolicyFormat::Json => write!(f, "json"),
        }
    }
}

impl Policy {
    /// Parse and validate a policy document from text.
    pub fn parse(content: &str, format: PolicyFormat) -> PolicyResult<Self> {
        let value: serde_json::Value = match format {
            PolicyFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| PolicyError::Parse {
                    format: format.to_string(),
                    message: e.to_string(),
                })?
            }
            PolicyFormat::Json => {
                serde_json::from_str(content).map_err(|e| PolicyError::Parse {
                    format: format.to_string(),
                    message: e.to_string(),
                })?
            }
        };

        Self::from_value(value)
    }

    /// Validate an already-deserialized mapping and build the typed policy.
    pub fn from_value(value: serde_json::Value) -> PolicyResult<Self> {
        schema::validate_policy_value(&value)?;

        serde_json::from_value(value).map_err(|e| PolicyError::schema("policy", e.to_string()))
    }

    /// Read, parse and validate a policy file. The extension selects the format.
    pub fn load_from(path: &Path) -> PolicyResult<Self> {
        if !path.exists() {
            return Err(PolicyError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let format = PolicyFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::parse(&content, format)
    }

    /// Profile names in sorted order.
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Look up a string-valued metadata field such as `owner` or `policy_id`.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Sorted profile names of a policy.
pub fn list_profiles(policy: &Policy) -> Vec<String> {
    policy.profile_names()
}

/// Load a policy from a source string.
///
/// - absent or blank: the `baseline` preset
/// - `preset:<name>`: a bundled preset
/// - anything else: a `.yml`/`.yaml`/`.json` file path
pub fn load_policy_source(source: Option<&str>) -> PolicyResult<Policy> {
    let source = source.map(str::trim).unwrap_or_default();
    if source.is_empty() {
        return load_preset(DEFAULT_PRESET);
    }

    if let Some(name) = source.strip_prefix(PRESET_PREFIX) {
        let name = name.trim();
        if name.is_empty() {
            return Err(PolicyError::InvalidPresetReference {
                reference: source.to_string(),
            });
        }
        return load_preset(name);
    }

    Policy::load_from(Path::new(source))
}

/// Human label for a policy source, as shown in explanations.
pub fn source_label(source: Option<&str>) -> String {
    match source.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => format!("{}{}", PRESET_PREFIX, DEFAULT_PRESET),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
