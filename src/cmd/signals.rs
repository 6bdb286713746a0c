//! `signals` command: absence signals computed from a course.

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use course_engine::formatters::format_signals;
use course_engine::signals::compute_course_signals;

use super::exit;
use super::ui::Output;

pub fn cmd_signals(course_path: &Path, output: &Output) -> Result<i32> {
    let course = super::load_course(course_path)?;
    let signals = compute_course_signals(&course);
    debug!(count = signals.len(), "computed signals");

    output.json(&signals);
    output.info(&format_signals(&signals));
    Ok(exit::SUCCESS)
}
