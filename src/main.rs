//! CLI entry point for course-engine.

mod cli;
mod cmd;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use cmd::ui::{Output, OutputMode};
use cmd::validate::ValidateOptions;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "COURSE_ENGINE_LOG";
const DEFAULT_LOG_FILTER: &str = "course_engine=warn";

fn main() {
    init_tracing();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{} {:#}", "Error:".red(), e);
            cmd::exit::LOAD_FAILED
        }
    };

    std::process::exit(code);
}

/// Diagnostics go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let quiet = cli.quiet;

    match cli.command {
        Commands::Validate {
            course,
            policy,
            profile,
            strict,
            json,
            list_profiles,
            explain,
        } => {
            let options = ValidateOptions {
                course,
                policy,
                profile,
                strict,
                list_profiles,
                explain,
            };
            let output = Output::new(OutputMode::from_flags(json, quiet));
            cmd::validate::cmd_validate(&options, &output)
        }
        Commands::Report {
            course,
            json,
            verbose,
            fail_on_gaps,
        } => {
            let output = Output::new(OutputMode::from_flags(json, quiet));
            cmd::report::cmd_report(&course, verbose, fail_on_gaps, &output)
        }
        Commands::Signals { course, json } => {
            let output = Output::new(OutputMode::from_flags(json, quiet));
            cmd::signals::cmd_signals(&course, &output)
        }
        Commands::Presets => cmd::util::cmd_presets(&Output::new(OutputMode::from_flags(false, quiet))),
        Commands::Version { verbose } => cmd::util::cmd_version(verbose),
        Commands::Completion { shell } => cmd::util::cmd_completion(shell),
    }
}
