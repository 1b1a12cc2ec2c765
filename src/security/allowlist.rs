//! Allowlist carve-outs.
//!
//! A command matching any allowlist pattern is treated as safe even when a
//! broader dangerous rule also fires. The allowlist is always consulted
//! before the dangerous catalog.

use regex::RegexSetBuilder;

use super::error::SafetyError;

/// Built-in carve-outs.
pub const BUILTIN_ALLOWLIST: &[&str] = &[
    // Temporary file deletion
    r"\brm\s+-[rfRF]*\s+/tmp/\w+",
    // Current directory file deletion (non-recursive to parent)
    r"\brm\s+-[rfRF]*\s+\./[^/]",
    // Loop device formatting
    r"\bmkfs\.\w+\s+/dev/loop\d+",
];

#[derive(Debug, Clone)]
pub struct Allowlist {
    patterns: Vec<&'static str>,
    set: regex::RegexSet,
}

impl Allowlist {
    /// Compile all patterns into one case-insensitive set.
    pub fn new(patterns: &[&'static str]) -> Result<Self, SafetyError> {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()
            .map_err(SafetyError::InvalidAllowlist)?;
        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn builtin() -> Result<Self, SafetyError> {
        Self::new(BUILTIN_ALLOWLIST)
    }

    pub fn patterns(&self) -> &[&'static str] {
        &self.patterns
    }

    pub fn is_allowed(&self, cmd: &str) -> bool {
        self.set.is_match(cmd)
    }

    /// First carve-out that matches, if any.
    pub fn matching(&self, cmd: &str) -> Option<&'static str> {
        self.set
            .matches(cmd)
            .iter()
            .next()
            .map(|idx| self.patterns[idx])
    }
}
