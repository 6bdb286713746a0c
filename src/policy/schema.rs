//! Structural checks run on a raw policy mapping before it is typed.
//!
//! Two regions are treated differently. The rule and signal sub-trees are
//! whitelisted key by key. Everything else at the top level is metadata and
//! passes through unchecked. Checks stop at the first violation.

use serde_json::{Map, Value};

use super::{Rules, SignalAction, POLICY_VERSION};
use crate::error::{PolicyError, PolicyResult};

const REQUIRE_COVERAGE_KEYS: [&str; 1] = ["min_domains"];
const REQUIRE_EVIDENCE_KEYS: [&str; 1] = ["min_items_per_domain"];
const SIGNALS_KEYS: [&str; 3] = ["default_action", "overrides", "ignore"];

/// Validate a deserialized policy document.
pub fn validate_policy_value(value: &Value) -> PolicyResult<()> {
    let policy = value.as_object().ok_or(PolicyError::NotAMapping)?;

    validate_version(policy)?;

    let profiles = match policy.get("profiles") {
        Some(Value::Object(profiles)) if !profiles.is_empty() => profiles,
        _ => {
            return Err(PolicyError::schema(
                "profiles",
                "Policy must define non-empty 'profiles'",
            ))
        }
    };

    if let Some(default_profile) = policy.get("default_profile") {
        if !default_profile.is_null() && !default_profile.is_string() {
            return Err(PolicyError::schema(
                "default_profile",
                "must be a profile name string",
            ));
        }
    }

    if let Some(block) = policy.get("signals") {
        validate_signals_block(block, "signals")?;
    }

    for (name, profile) in profiles {
        validate_profile(name, profile)?;
    }

    Ok(())
}

fn validate_version(policy: &Map<String, Value>) -> PolicyResult<()> {
    if policy.contains_key("version") && policy.contains_key("policy_version") {
        return Err(PolicyError::schema(
            "version",
            "set either 'version' or 'policy_version', not both",
        ));
    }

    let version = policy.get("version").or_else(|| policy.get("policy_version"));
    match version {
        Some(v) if v.as_u64() == Some(POLICY_VERSION) => Ok(()),
        Some(v) => Err(PolicyError::Version {
            found: v.to_string(),
        }),
        None => Err(PolicyError::Version {
            found: "nothing".to_string(),
        }),
    }
}

fn validate_profile(name: &str, profile: &Value) -> PolicyResult<()> {
    let path = format!("profiles.{}", name);
    let profile = profile
        .as_object()
        .ok_or_else(|| PolicyError::schema(&path, "must be a mapping/object"))?;

    if let Some(extends) = profile.get("extends") {
        if !extends.is_null() && !extends.is_string() {
            return Err(PolicyError::schema(
                format!("{}.extends", path),
                "must be a profile name string",
            ));
        }
    }

    if let Some(description) = profile.get("description") {
        if !description.is_null() && !description.is_string() {
            return Err(PolicyError::schema(
                format!("{}.description", path),
                "must be a string",
            ));
        }
    }

    match profile.get("rules") {
        Some(Value::Object(rules)) => validate_rules(rules, &format!("{}.rules", path))?,
        _ => {
            return Err(PolicyError::schema(
                format!("{}.rules", path),
                "Profile rules must be a mapping",
            ))
        }
    }

    if let Some(block) = profile.get("signals") {
        validate_signals_block(block, &format!("{}.signals", path))?;
    }

    Ok(())
}

fn validate_rules(rules: &Map<String, Value>, path: &str) -> PolicyResult<()> {
    for key in rules.keys() {
        if !Rules::KEYS.contains(&key.as_str()) {
            return Err(PolicyError::UnknownRuleKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }
    }

    if let Some(block) = rules.get("require_coverage") {
        validate_nested_rule(block, &format!("{}.require_coverage", path), &REQUIRE_COVERAGE_KEYS)?;
    }

    if let Some(block) = rules.get("require_evidence") {
        validate_nested_rule(block, &format!("{}.require_evidence", path), &REQUIRE_EVIDENCE_KEYS)?;
    }

    if let Some(value) = rules.get("min_coverage_items_per_domain") {
        expect_count(value, &format!("{}.min_coverage_items_per_domain", path))?;
    }

    if let Some(value) = rules.get("forbid_empty_domains") {
        if !value.is_boolean() {
            return Err(PolicyError::schema(
                format!("{}.forbid_empty_domains", path),
                "must be true or false",
            ));
        }
    }

    Ok(())
}

fn validate_nested_rule(block: &Value, path: &str, allowed: &[&str]) -> PolicyResult<()> {
    let block = block
        .as_object()
        .ok_or_else(|| PolicyError::schema(path, "must be a mapping/object"))?;

    for (key, value) in block {
        if !allowed.contains(&key.as_str()) {
            return Err(PolicyError::UnknownRuleKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }
        expect_count(value, &format!("{}.{}", path, key))?;
    }

    Ok(())
}

fn expect_count(value: &Value, path: &str) -> PolicyResult<()> {
    if value.as_u64().is_none() {
        return Err(PolicyError::schema(
            path,
            format!("must be a non-negative integer (found {})", value),
        ));
    }
    Ok(())
}

fn validate_signals_block(block: &Value, path: &str) -> PolicyResult<()> {
    let block = match block {
        Value::Null => return Ok(()),
        Value::Object(block) => block,
        _ => return Err(PolicyError::schema(path, "must be a mapping/object")),
    };

    for key in block.keys() {
        if !SIGNALS_KEYS.contains(&key.as_str()) {
            return Err(PolicyError::schema(
                format!("{}.{}", path, key),
                "unsupported signals key",
            ));
        }
    }

    if let Some(action) = block.get("default_action") {
        if !action.is_null() {
            expect_action(action, &format!("{}.default_action", path))?;
        }
    }

    match block.get("overrides") {
        None | Some(Value::Null) => {}
        Some(Value::Object(overrides)) => {
            for (signal_id, action) in overrides {
                if signal_id.trim().is_empty() {
                    return Err(PolicyError::schema(
                        format!("{}.overrides", path),
                        "keys must be non-empty strings (signal IDs)",
                    ));
                }
                expect_action(action, &format!("{}.overrides.{}", path, signal_id))?;
            }
        }
        Some(_) => {
            return Err(PolicyError::schema(
                format!("{}.overrides", path),
                "must be a mapping of {SIGNAL_ID: action}",
            ))
        }
    }

    match block.get("ignore") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            let all_ids = items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty()));
            if !all_ids {
                return Err(PolicyError::schema(
                    format!("{}.ignore", path),
                    "must be a list of signal ID strings",
                ));
            }
        }
        Some(_) => {
            return Err(PolicyError::schema(
                format!("{}.ignore", path),
                "must be a list of signal ID strings",
            ))
        }
    }

    Ok(())
}

fn expect_action(value: &Value, path: &str) -> PolicyResult<()> {
    match value.as_str().and_then(SignalAction::parse) {
        Some(_) => Ok(()),
        None => Err(PolicyError::InvalidAction {
            path: path.to_string(),
            found: value.to_string(),
        }),
    }
}
