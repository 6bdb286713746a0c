//! CLI argument definitions for course-engine.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "course-engine")]
#[command(version)]
#[command(about = "Policy-driven governance checks for course specifications", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    course-engine report course.yml                  Coverage per capability domain\n    course-engine validate course.yml --strict       Validate against the baseline preset\n    course-engine validate course.yml --policy preset:strict-ci --explain\n\n    Set COURSE_ENGINE_LOG=course_engine=debug for diagnostics on stderr."
)]
pub struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a course against a policy profile
    ///
    /// Exit codes: 0 when validation passes, 3 when it fails (strict-mode
    /// errors or a signal the policy escalates to error), 2 when the course
    /// or policy cannot be loaded or the profile cannot be resolved.
    Validate {
        /// Path to the course specification (course.yml)
        course: PathBuf,
        /// Policy source: a .yml/.yaml/.json path or preset:<name>
        #[arg(long, value_name = "SOURCE")]
        policy: Option<String>,
        /// Profile within the selected policy
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Treat structural rule violations as errors
        #[arg(long)]
        strict: bool,
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
        /// List profiles of the selected policy and exit
        #[arg(long)]
        list_profiles: bool,
        /// Explain the resolved policy, chain, rules and signals and exit
        #[arg(long)]
        explain: bool,
    },
    /// Print the capability coverage report for a course
    Report {
        /// Path to the course specification (course.yml)
        course: PathBuf,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
        /// Include the declared coverage and evidence lists
        #[arg(long)]
        verbose: bool,
        /// Exit with code 2 if any domain has no coverage and no evidence
        #[arg(long)]
        fail_on_gaps: bool,
    },
    /// Show the absence signals computed for a course
    Signals {
        /// Path to the course specification (course.yml)
        course: PathBuf,
        /// Output signals as JSON
        #[arg(long)]
        json: bool,
    },
    /// List bundled preset policies
    Presets,
    /// Show version information
    Version {
        /// Show additional build information
        #[arg(long, short)]
        verbose: bool,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}
