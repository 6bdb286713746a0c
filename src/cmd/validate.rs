//! `validate` command: evaluate a course against a resolved policy profile.

use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

use course_engine::formatters::{format_explanation, format_validation};
use course_engine::policy::{
    list_profiles, load_policy_source, resolve_profile, source_label, PolicyExplanation,
};
use course_engine::report::CapabilityReport;
use course_engine::signals::compute_course_signals;
use course_engine::validation::evaluate;

use super::exit;
use super::ui::{Output, OutputMode};

/// Options collected from `course-engine validate`.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub course: PathBuf,
    pub policy: Option<String>,
    pub profile: Option<String>,
    pub strict: bool,
    pub list_profiles: bool,
    pub explain: bool,
}

/// Run the validate command and return the process exit code.
pub fn cmd_validate(options: &ValidateOptions, output: &Output) -> Result<i32> {
    let source = options.policy.as_deref();
    let label = source_label(source);
    let policy = load_policy_source(source)?;
    debug!(source = %label, profiles = policy.profiles.len(), "loaded policy");

    if options.list_profiles {
        let names = list_profiles(&policy);
        output.json(&json!({ "policy": label, "profiles": names }));
        for name in &names {
            output.info(name);
        }
        return Ok(exit::SUCCESS);
    }

    let resolved = resolve_profile(&policy, options.profile.as_deref())?;
    debug!(
        profile = %resolved.profile,
        chain = ?resolved.chain,
        "resolved policy profile"
    );

    if options.explain {
        let explanation = PolicyExplanation::new(&label, &policy, &resolved, options.strict);
        output.json(&explanation);
        output.info(&format_explanation(&explanation));
        return Ok(exit::SUCCESS);
    }

    let course = super::load_course(&options.course)?;
    let report = CapabilityReport::from_course(&course);
    let signals = compute_course_signals(&course);

    let result = evaluate(&resolved, &report, &signals, options.strict)?;
    debug!(
        ok = result.ok,
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        signals = result.resolved_signals.len(),
        "validation finished"
    );

    output.json(&result.to_json_value());
    output.info(&format_validation(&result));

    if result.ok {
        return Ok(exit::SUCCESS);
    }

    if output.mode() == OutputMode::Quiet {
        output.error(&format!(
            "Validation failed with {} error(s)",
            result.errors().len()
        ));
    }
    Ok(exit::VALIDATION_FAILED)
}
