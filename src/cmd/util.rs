//! Utility commands (presets, version, completion).

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

use course_engine::policy::list_presets;

use super::exit;
use super::ui::Output;
use crate::cli::Cli;

/// List bundled preset policy names
pub fn cmd_presets(output: &Output) -> Result<i32> {
    let names = list_presets();
    output.json(&names);
    for name in &names {
        output.info(name);
    }
    Ok(exit::SUCCESS)
}

/// Show version information
pub fn cmd_version(verbose: bool) -> Result<i32> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("course-engine {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(exit::SUCCESS)
}

/// Generate shell completion script
pub fn cmd_completion(shell: Shell) -> Result<i32> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "course-engine", &mut io::stdout());
    Ok(exit::SUCCESS)
}
