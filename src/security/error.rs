//! Error types for the safety engine.

use thiserror::Error;

/// Errors raised while building the engine or talking to the operator.
///
/// Construction errors are fatal: an engine is never built from a partial
/// catalog. Interaction errors never reach the caller of a safety check,
/// they are turned into a denial.
#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("invalid dangerous pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid allowlist pattern set: {0}")]
    InvalidAllowlist(#[source] regex::Error),

    #[error("invalid safety configuration: {0}")]
    InvalidConfig(String),

    #[error("operator interaction failed: {0}")]
    Interaction(#[from] std::io::Error),
}
