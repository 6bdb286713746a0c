//! Built-in policies compiled into the binary.

use super::{Policy, PolicyFormat};
use crate::error::{PolicyError, PolicyResult};

/// Preset used when no policy source is given.
pub const DEFAULT_PRESET: &str = "baseline";

/// Preset catalogue, sorted by name.
const PRESETS: &[(&str, &str)] = &[
    ("baseline", include_str!("../../presets/policies/baseline.yml")),
    (
        "higher-ed-example",
        include_str!("../../presets/policies/higher-ed-example.yml"),
    ),
    ("strict-ci", include_str!("../../presets/policies/strict-ci.yml")),
];

/// Names of all bundled presets in sorted order.
pub fn list_presets() -> Vec<String> {
    let mut names: Vec<String> = PRESETS.iter().map(|(name, _)| name.to_string()).collect();
    names.sort();
    names
}

/// Raw YAML text of a bundled preset.
pub fn preset_source(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, text)| *text)
}

/// Parse and validate a bundled preset.
pub fn load_preset(name: &str) -> PolicyResult<Policy> {
    let text = preset_source(name).ok_or_else(|| PolicyError::UnknownPreset {
        name: name.to_string(),
        available: list_presets(),
    })?;

    Policy::parse(text, PolicyFormat::Yaml)
}
