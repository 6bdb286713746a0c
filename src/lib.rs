//! # Course Engine - governance validation for course specifications
//!
//! Course Engine checks a course's declared capability mapping against a
//! versioned, profile-based policy and reports explainable issues instead of
//! opaque pass/fail answers.
//!
//! ## Overview
//!
//! A course file declares framework alignment and a capability mapping
//! (coverage and evidence per domain). The engine summarises that mapping in a
//! coverage report, computes absence signals from the governance metadata,
//! resolves one policy profile through its inheritance chain and evaluates the
//! report and signals against it.
//!
//! ## Modules
//!
//! - [`course`] - Course specification model and identity checks
//! - [`policy`] - Policy loading, schema checks, presets and profile resolution
//! - [`report`] - Capability coverage report
//! - [`signals`] - Policy-independent absence signals
//! - [`validation`] - Evaluation of a resolved profile against a report
//! - [`formatters`] - Human-readable renderings
//! - [`error`] - Loader, resolver and evaluation errors
//!
//! ## Example
//!
//! ```no_run
//! use course_engine::course::CourseSpec;
//! use course_engine::policy::{load_policy_source, resolve_profile};
//! use course_engine::report::CapabilityReport;
//! use course_engine::signals::compute_course_signals;
//! use course_engine::validation::evaluate;
//!
//! let content = std::fs::read_to_string("course.yml").expect("read course");
//! let course = CourseSpec::parse(&content).expect("parse course");
//!
//! let policy = load_policy_source(Some("preset:strict-ci")).expect("load policy");
//! let profile = resolve_profile(&policy, None).expect("resolve profile");
//!
//! let report = CapabilityReport::from_course(&course);
//! let signals = compute_course_signals(&course);
//! let result = evaluate(&profile, &report, &signals, true).expect("evaluate");
//!
//! if !result.ok {
//!     println!("{} error(s)", result.errors().len());
//! }
//! ```

pub mod course;
pub mod error;
pub mod formatters;
pub mod policy;
pub mod report;
pub mod signals;
pub mod validation;
