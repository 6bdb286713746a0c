//! Profile resolution: inheritance walk plus rule and signal-policy merging.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{
    Policy, Profile, RequireCoverage, RequireEvidence, Rules, SignalAction, SignalsBlock,
    SignalsPolicy,
};
use crate::error::{PolicyError, PolicyResult};

/// Most profiles an inheritance chain may contain, base and selected included.
pub const MAX_INHERITANCE_DEPTH: usize = 5;

/// Profile selected when neither the caller nor the policy names one.
pub const FALLBACK_PROFILE: &str = "baseline";

/// A profile flattened along its inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered base first, selected profile last.
    pub chain: Vec<String>,
    pub rules: Rules,
    pub signals: SignalsPolicy,
}

impl ResolvedProfile {
    /// Profile carrying no rules and the default signal policy.
    pub fn unconstrained(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            chain: vec![name.clone()],
            profile: name,
            description: None,
            rules: Rules::default(),
            signals: SignalsPolicy::default(),
        }
    }
}

/// Resolve `requested` (or the policy default, or `baseline`) into one profile.
pub fn resolve_profile(policy: &Policy, requested: Option<&str>) -> PolicyResult<ResolvedProfile> {
    let selected = select_profile_name(policy, requested);

    if !policy.profiles.contains_key(&selected) {
        return Err(PolicyError::UnknownProfile {
            name: selected,
            available: policy.profile_names(),
        });
    }

    let chain = inheritance_chain(&policy.profiles, &selected)?;

    let mut rules = Rules::default();
    let mut signals = SignalsPolicy::from_block(policy.signals.as_ref());

    for name in &chain {
        let profile = &policy.profiles[name];
        rules = rules.merged_with(&profile.rules);
        if let Some(block) = &profile.signals {
            signals = signals.merged_with(block);
        }
    }

    let description = policy.profiles[&selected].description.clone();

    Ok(ResolvedProfile {
        profile: selected,
        description,
        chain,
        rules,
        signals,
    })
}

fn select_profile_name(policy: &Policy, requested: Option<&str>) -> String {
    [requested, policy.default_profile.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(FALLBACK_PROFILE)
        .to_string()
}

/// Follow `extends` links from `selected` to its base profile.
///
/// The returned chain is ordered base first. Fails on a revisited profile, on
/// a chain longer than [`MAX_INHERITANCE_DEPTH`], or on a missing parent.
pub fn inheritance_chain(
    profiles: &BTreeMap<String, Profile>,
    selected: &str,
) -> PolicyResult<Vec<String>> {
    let mut chain: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = selected;

    loop {
        if !seen.insert(current) {
            let mut cycle: Vec<String> = chain.clone();
            cycle.push(current.to_string());
            return Err(PolicyError::Cycle { chain: cycle });
        }

        chain.push(current.to_string());
        if chain.len() > MAX_INHERITANCE_DEPTH {
            return Err(PolicyError::DepthExceeded {
                profile: selected.to_string(),
                limit: MAX_INHERITANCE_DEPTH,
            });
        }

        let profile = profiles
            .get(current)
            .ok_or_else(|| PolicyError::UnknownProfile {
                name: current.to_string(),
                available: profiles.keys().cloned().collect(),
            })?;

        let Some(parent) = profile.parent() else {
            break;
        };

        if !profiles.contains_key(parent) {
            return Err(PolicyError::UnknownParent {
                child: current.to_string(),
                parent: parent.to_string(),
            });
        }

        current = parent;
    }

    chain.reverse();
    Ok(chain)
}

impl Rules {
    /// Overlay `child` onto these rules.
    ///
    /// `require_coverage` and `require_evidence` merge key by key; every other
    /// rule set by the child replaces the parent's value outright.
    pub fn merged_with(&self, child: &Rules) -> Rules {
        let require_coverage = match (&self.require_coverage, &child.require_coverage) {
            (Some(parent), Some(child)) => Some(RequireCoverage {
                min_domains: child.min_domains.or(parent.min_domains),
            }),
            (parent, child) => child.clone().or_else(|| parent.clone()),
        };

        let require_evidence = match (&self.require_evidence, &child.require_evidence) {
            (Some(parent), Some(child)) => Some(RequireEvidence {
                min_items_per_domain: child.min_items_per_domain.or(parent.min_items_per_domain),
            }),
            (parent, child) => child.clone().or_else(|| parent.clone()),
        };

        Rules {
            require_coverage,
            require_evidence,
            min_coverage_items_per_domain: child
                .min_coverage_items_per_domain
                .or(self.min_coverage_items_per_domain),
            forbid_empty_domains: child.forbid_empty_domains.or(self.forbid_empty_domains),
        }
    }
}

impl SignalsPolicy {
    /// Normalise an authored block, filling unset fields with defaults.
    pub fn from_block(block: Option<&SignalsBlock>) -> Self {
        match block {
            Some(block) => SignalsPolicy::default().merged_with(block),
            None => SignalsPolicy::default(),
        }
    }

    /// Overlay a child block.
    ///
    /// - `default_action`: the child's value when set, else ours
    /// - `overrides`: union, child wins per signal id
    /// - `ignore`: union, our entries first, then the child's new ones in order
    pub fn merged_with(&self, child: &SignalsBlock) -> Self {
        let default_action = child.default_action.unwrap_or(self.default_action);

        let mut overrides = self.overrides.clone();
        for (signal_id, action) in &child.overrides {
            let signal_id = signal_id.trim();
            if !signal_id.is_empty() {
                overrides.insert(signal_id.to_string(), *action);
            }
        }

        let mut ignore = self.ignore.clone();
        for signal_id in child.ignore.iter().map(|s| s.trim()) {
            if !signal_id.is_empty() && !ignore.iter().any(|s| s == signal_id) {
                ignore.push(signal_id.to_string());
            }
        }

        SignalsPolicy {
            default_action,
            overrides,
            ignore,
        }
    }

    /// Is this signal on the ignore list?
    pub fn ignores(&self, signal_id: &str) -> bool {
        self.ignore.iter().any(|s| s == signal_id)
    }

    pub fn override_for(&self, signal_id: &str) -> Option<SignalAction> {
        self.overrides.get(signal_id).copied()
    }
}
