//! Security module for dangerous command detection and confirmation.
//!
//! This module classifies candidate shell commands against a fixed catalog
//! of destructive patterns, and walks the operator through a confirmation
//! ritual whose strictness follows the highest risk level matched.

mod allowlist;
mod analyzer;
mod cache;
mod config;
mod confirm;
mod engine;
mod error;
mod operator;
mod patterns;
mod report;

#[cfg(test)]
mod tests;

pub use allowlist::{Allowlist, BUILTIN_ALLOWLIST};
pub use analyzer::{analyze_command, CommandRiskReport, MatchSummary, RiskAnalysis};
pub use cache::{ConfirmationCache, Fingerprint, DEFAULT_FINGERPRINT_LEN};
pub use config::{default_config_path, home_dir, SafetyConfig};
pub use confirm::confirm_command;
pub use engine::{BlockedCommand, GateResult, SafetyEngine};
pub use error::SafetyError;
pub use operator::{ConsoleOperator, Notice, Operator, Prompt, PromptKind, ScriptedOperator};
pub use patterns::{Category, DangerousPattern, PatternRegistry, PatternRule, RiskLevel, BUILTIN_RULES};
pub use report::{self_test, SafetyReport, SelfTestCase, SelfTestReport, SELF_TEST_CASES};

/// Final decision for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allowed(Allowance),
    Denied(Denial),
}

impl Outcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allowed(_))
    }
}

/// Why a command was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    /// Nothing to classify.
    Empty,
    /// No dangerous pattern matched, or an allowlist carve-out did.
    NotDangerous,
    /// Only LOW-risk rules matched.
    LowRisk,
    /// Confirmed earlier in this session.
    PreviouslyConfirmed,
    Confirmed,
}

/// Why a command was blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Anything but `y`/`yes` at the MEDIUM tier.
    Declined,
    /// Wrong acknowledgment phrase.
    PhraseMismatch,
    /// CRITICAL retype attempts used up.
    AttemptsExhausted,
    /// Input closed before an answer.
    Aborted,
    /// The check itself failed.
    Fault(String),
}
