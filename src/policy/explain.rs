//! Explain which policy, profile chain, rules and signal policy are in force.

use serde::Serialize;

use super::{Policy, ResolvedProfile, Rules, SignalsPolicy};

/// Policy identity as shown to reviewers.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub source: String,
    pub policy_id: Option<String>,
    pub policy_name: Option<String>,
    pub owner: Option<String>,
    pub last_updated: Option<String>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub description: Option<String>,
}

/// Everything needed to answer "what exactly will validation enforce?".
#[derive(Debug, Clone, Serialize)]
pub struct PolicyExplanation {
    pub policy: PolicySummary,
    pub profile: ProfileSummary,
    pub chain: Vec<String>,
    pub rules: Rules,
    pub signals: SignalsPolicy,
    pub strict: bool,
}

impl PolicyExplanation {
    pub fn new(source: &str, policy: &Policy, resolved: &ResolvedProfile, strict: bool) -> Self {
        let field = |key: &str| policy.metadata_str(key).map(str::to_string);

        Self {
            policy: PolicySummary {
                source: source.to_string(),
                policy_id: field("policy_id"),
                policy_name: field("policy_name"),
                owner: field("owner"),
                last_updated: field("last_updated"),
                version: policy.version,
            },
            profile: ProfileSummary {
                name: resolved.profile.clone(),
                description: resolved.description.clone(),
            },
            chain: resolved.chain.clone(),
            rules: resolved.rules.clone(),
            signals: resolved.signals.clone(),
            strict,
        }
    }
}
