//! Operator-facing status: catalog statistics and the built-in self-test.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::cache::ConfirmationCache;
use super::engine::SafetyEngine;
use super::patterns::{Category, PatternRegistry, RiskLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub total_patterns: usize,
    pub patterns_by_category: BTreeMap<Category, usize>,
    pub patterns_by_risk: BTreeMap<RiskLevel, usize>,
    /// Commands confirmed during this session.
    pub confirmed_commands_count: usize,
}

impl SafetyReport {
    pub fn collect(registry: &PatternRegistry, cache: &ConfirmationCache) -> Self {
        let mut patterns_by_category = BTreeMap::new();
        let mut patterns_by_risk = BTreeMap::new();
        for pattern in registry.patterns() {
            *patterns_by_category.entry(pattern.category()).or_insert(0) += 1;
            *patterns_by_risk.entry(pattern.risk_level()).or_insert(0) += 1;
        }

        Self {
            total_patterns: registry.len(),
            patterns_by_category,
            patterns_by_risk,
            confirmed_commands_count: cache.len(),
        }
    }
}

impl fmt::Display for SafetyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🛡️  Security System Report")?;
        writeln!(f, "{}", "=".repeat(45))?;
        writeln!(f, "Total Dangerous Patterns: {}", self.total_patterns)?;
        writeln!(f, "Confirmed Commands (Session): {}", self.confirmed_commands_count)?;
        writeln!(f)?;

        writeln!(f, "📊 Patterns by Category:")?;
        for (category, count) in &self.patterns_by_category {
            writeln!(f, "  • {}: {} patterns", category, count)?;
        }
        writeln!(f)?;

        // highest risk first
        writeln!(f, "⚠️  Patterns by Risk Level:")?;
        for (risk, count) in self.patterns_by_risk.iter().rev() {
            writeln!(f, "  • {}: {} patterns", risk, count)?;
        }
        Ok(())
    }
}

/// Commands with a known expected classification.
pub const SELF_TEST_CASES: &[(&str, bool)] = &[
    ("ls -la", false),
    ("rm -rf /", true),
    ("mkfs.ext4 /dev/sda1", true),
    ("shutdown -h now", true),
    ("find /tmp -name '*.log' -delete", true),
    ("cat file.txt", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfTestCase {
    pub command: String,
    pub expected_dangerous: bool,
    pub is_dangerous: bool,
    pub risk_level: RiskLevel,
}

impl SelfTestCase {
    pub fn passed(&self) -> bool {
        self.expected_dangerous == self.is_dangerous
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfTestReport {
    pub cases: Vec<SelfTestCase>,
}

impl SelfTestReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.cases.len()
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🧪 Running Security System Self-Test...")?;
        writeln!(f, "{}", "=".repeat(50))?;
        for case in &self.cases {
            let status = if case.passed() { "✅ PASS" } else { "❌ FAIL" };
            if case.is_dangerous {
                writeln!(f, "{} {} ({})", status, case.command, case.risk_level)?;
            } else {
                writeln!(f, "{} {} (SAFE)", status, case.command)?;
            }
        }
        writeln!(f, "{}", "=".repeat(50))?;

        let total = self.cases.len();
        let passed = self.passed();
        let pct = if total == 0 {
            100.0
        } else {
            passed as f64 / total as f64 * 100.0
        };
        write!(f, "Test Results: {}/{} passed ({:.1}%)", passed, total, pct)
    }
}

/// Classify the fixed sample set. Never prompts.
pub fn self_test(engine: &SafetyEngine) -> SelfTestReport {
    let cases = SELF_TEST_CASES
        .iter()
        .map(|&(command, expected_dangerous)| {
            let analysis = engine.analyze(command);
            SelfTestCase {
                command: command.to_string(),
                expected_dangerous,
                is_dangerous: analysis.is_dangerous,
                risk_level: analysis.max_risk,
            }
        })
        .collect();
    SelfTestReport { cases }
}
