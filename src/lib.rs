//! RustyGuard - dangerous command detection and confirmation for AI-generated shell commands
//!
//! This library provides the safety gate that sits between a model suggesting a
//! shell command and anything that would run it:
//! - A fixed catalog of destructive command patterns with allowlist carve-outs
//! - Risk classification (LOW, MEDIUM, HIGH, CRITICAL) of a command string
//! - A confirmation ritual whose strictness follows the risk level
//! - A session cache of confirmed commands and an aggregate safety report
//!
//! # Example
//!
//! ```no_run
//! use rusty_guard::security::{ConsoleOperator, SafetyEngine};
//!
//! fn main() -> anyhow::Result<()> {
//!     // Build once at startup and hand it to whatever runs commands
//!     let engine = SafetyEngine::new()?;
//!     let mut operator = ConsoleOperator::stdio();
//!
//!     let suggested = "find . -name '*.tmp' -delete";
//!     if engine.check_command_safety(suggested, false, &mut operator) {
//!         // hand the command to the executor
//!     }
//!
//!     println!("{}", engine.safety_report());
//!     Ok(())
//! }
//! ```

pub mod security;
pub mod utils;

// Re-export commonly used types
pub use security::{Outcome, RiskLevel, SafetyConfig, SafetyEngine, SafetyError};
