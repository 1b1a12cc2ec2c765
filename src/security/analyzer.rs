//! Risk classification of a single command string.

use serde::Serialize;

use super::patterns::{Category, DangerousPattern, PatternRegistry, RiskLevel};

/// Verdict of [`analyze_command`].
///
/// `matches` keeps catalog order. `max_risk` is `Low` when nothing matched.
#[derive(Debug, Clone)]
pub struct RiskAnalysis<'a> {
    pub is_dangerous: bool,
    pub matches: Vec<&'a DangerousPattern>,
    pub max_risk: RiskLevel,
    /// Allowlist carve-out that short-circuited classification.
    pub allowed_by: Option<&'static str>,
}

impl<'a> RiskAnalysis<'a> {
    fn safe(allowed_by: Option<&'static str>) -> Self {
        Self {
            is_dangerous: false,
            matches: Vec::new(),
            max_risk: RiskLevel::Low,
            allowed_by,
        }
    }

    /// First match (catalog order) carrying the highest risk level.
    pub fn primary(&self) -> Option<&'a DangerousPattern> {
        self.matches
            .iter()
            .copied()
            .find(|p| p.risk_level() == self.max_risk)
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut out: Vec<Category> = Vec::new();
        for m in &self.matches {
            if !out.contains(&m.category()) {
                out.push(m.category());
            }
        }
        out
    }
}

/// Classify `cmd` against the registry.
///
/// The allowlist wins outright. Past it, every dangerous rule is tried and
/// all hits are kept, since one command can trip several categories at once.
pub fn analyze_command<'a>(registry: &'a PatternRegistry, cmd: &str) -> RiskAnalysis<'a> {
    if let Some(carve_out) = registry.allowlist().matching(cmd) {
        tracing::debug!(pattern = carve_out, "Command matched allowlist");
        return RiskAnalysis::safe(Some(carve_out));
    }

    let matches: Vec<&DangerousPattern> = registry
        .patterns()
        .iter()
        .filter(|p| p.is_match(cmd))
        .collect();

    if matches.is_empty() {
        return RiskAnalysis::safe(None);
    }

    let max_risk = matches
        .iter()
        .map(|p| p.risk_level())
        .max()
        .unwrap_or(RiskLevel::Low);

    tracing::debug!(
        matches = matches.len(),
        max_risk = %max_risk,
        "Command matched dangerous patterns"
    );

    RiskAnalysis {
        is_dangerous: true,
        matches,
        max_risk,
        allowed_by: None,
    }
}

/// One matched rule, owned and ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub pattern: String,
    pub category: Category,
    pub description: String,
    pub risk_level: RiskLevel,
    pub examples: Vec<String>,
}

impl From<&DangerousPattern> for MatchSummary {
    fn from(p: &DangerousPattern) -> Self {
        Self {
            pattern: p.pattern().to_string(),
            category: p.category(),
            description: p.description().to_string(),
            risk_level: p.risk_level(),
            examples: p.examples().iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Non-interactive inspection result, detached from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRiskReport {
    pub is_dangerous: bool,
    pub risk_level: RiskLevel,
    pub matches: Vec<MatchSummary>,
}

impl From<&RiskAnalysis<'_>> for CommandRiskReport {
    fn from(analysis: &RiskAnalysis<'_>) -> Self {
        Self {
            is_dangerous: analysis.is_dangerous,
            risk_level: analysis.max_risk,
            matches: analysis.matches.iter().map(|p| MatchSummary::from(*p)).collect(),
        }
    }
}
