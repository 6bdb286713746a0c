//! Error types for policy loading, profile resolution and evaluation.
//!
//! Rule violations are never errors; they are reported as
//! [`ValidationIssue`](crate::validation::ValidationIssue)s. The variants here
//! cover documents that cannot be loaded, profiles that cannot be resolved and
//! inputs whose shape is broken.

/// Errors raised while loading a policy or resolving one of its profiles.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Policy file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read policy {path}: {message}")]
    Io { path: String, message: String },

    #[error("Unsupported policy file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse policy ({format}): {message}")]
    Parse { format: String, message: String },

    #[error("Policy must parse to a mapping/object.")]
    NotAMapping,

    #[error("version must be 1 (found {found})")]
    Version { found: String },

    #[error("{path}: {message}")]
    Schema { path: String, message: String },

    #[error("Unsupported rule key: {key} (in {path})")]
    UnknownRuleKey { path: String, key: String },

    #[error("{path} must be one of: ignore|info|warn|error (found {found})")]
    InvalidAction { path: String, found: String },

    #[error("Invalid preset policy reference: {reference:?}")]
    InvalidPresetReference { reference: String },

    #[error("Unknown preset policy '{name}'. Available: {}", available.join(", "))]
    UnknownPreset { name: String, available: Vec<String> },

    #[error("Unknown profile '{name}'. Available profiles: {}", available.join(", "))]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("Unknown parent profile '{parent}' (extended by '{child}')")]
    UnknownParent { child: String, parent: String },

    #[error("Inheritance cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("Inheritance depth exceeded: '{profile}' has more than {limit} profiles in its inheritance chain")]
    DepthExceeded { profile: String, limit: usize },
}

impl PolicyError {
    pub(crate) fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        PolicyError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for failures raised by the profile resolver rather than the loader.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            PolicyError::UnknownProfile { .. }
                | PolicyError::UnknownParent { .. }
                | PolicyError::Cycle { .. }
                | PolicyError::DepthExceeded { .. }
        )
    }
}

/// Errors raised when a capability report handed to the engine is malformed.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Malformed capability report: {0}")]
    MalformedReport(String),

    #[error("Failed to parse capability report: {0}")]
    Parse(String),
}

/// Errors raised while reading or checking a course specification.
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Failed to parse course specification: {0}")]
    Parse(String),

    #[error("Invalid course specification: {field}: {message}")]
    Invalid { field: String, message: String },
}

pub type PolicyResult<T> = std::result::Result<T, PolicyError>;
