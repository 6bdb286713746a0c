//! `report` command: capability coverage per domain.

use anyhow::Result;
use serde_json::json;
use std::path::Path;
use tracing::debug;

use course_engine::formatters::{format_alignment_only, format_report};
use course_engine::report::CapabilityReport;

use super::exit;
use super::ui::Output;

const NO_MAPPING_NOTE: &str = "No capability_mapping present; coverage report not available.";

/// Run the report command and return the process exit code.
pub fn cmd_report(course_path: &Path, verbose: bool, fail_on_gaps: bool, output: &Output) -> Result<i32> {
    let course = super::load_course(course_path)?;

    if course.capability_mapping.is_some() {
        let report = CapabilityReport::from_course(&course);
        debug!(
            domains = report.domains.len(),
            gaps = report.summary.gaps,
            "built capability report"
        );

        output.json(&report);
        output.info(&format_report(&report, verbose));

        if fail_on_gaps && report.has_gaps() {
            output.warn(&format!(
                "{} domain(s) have no coverage and no evidence: {}",
                report.summary.gaps,
                report.summary.gap_domains.join(", ")
            ));
            return Ok(exit::GAPS_FOUND);
        }
        return Ok(exit::SUCCESS);
    }

    if let Some(alignment) = &course.framework_alignment {
        output.json(&json!({
            "kind": "framework_alignment_only",
            "framework_alignment": alignment,
            "note": NO_MAPPING_NOTE,
        }));
        output.info(&format_alignment_only(alignment));
        return Ok(exit::SUCCESS);
    }

    output.error(&format!(
        "No capability_mapping found in {} (nothing to report).",
        course_path.display()
    ));
    Ok(exit::NOTHING_TO_REPORT)
}
