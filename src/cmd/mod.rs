//! Command module structure for the course-engine CLI

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use course_engine::course::CourseSpec;

pub mod report;
pub mod signals;
pub mod ui;
pub mod util;
pub mod validate;

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    /// `report` found neither a capability mapping nor a framework alignment.
    pub const NOTHING_TO_REPORT: i32 = 1;
    /// Course or policy could not be loaded, or a profile could not be resolved.
    pub const LOAD_FAILED: i32 = 2;
    /// `report --fail-on-gaps` found at least one gap domain.
    pub const GAPS_FOUND: i32 = 2;
    /// Validation ran and `ok` is false.
    pub const VALIDATION_FAILED: i32 = 3;
}

/// Read and parse a course specification file.
pub fn load_course(path: &Path) -> Result<CourseSpec> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read course specification {}", path.display()))?;
    let course = CourseSpec::parse(&content)
        .with_context(|| format!("Invalid course specification {}", path.display()))?;

    debug!(
        path = %path.display(),
        course_id = %course.course.id,
        mapping = course.capability_mapping.is_some(),
        "loaded course"
    );
    Ok(course)
}
