//! Catalog of dangerous command rules.
//!
//! The catalog is a static table compiled once into [`PatternRegistry`].
//! Nothing mutates it afterwards, so classifying the same string twice
//! always yields the same matches.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::allowlist::Allowlist;
use super::error::SafetyError;

/// Ordered severity of a dangerous command.
///
/// The ordering drives both the confirmation tier and which match wins
/// when several rules fire on one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping label for rules, used by reports and the threat banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "File System Destruction")]
    FileSystemDestruction,
    #[serde(rename = "Disk Operations")]
    DiskOperations,
    #[serde(rename = "System Control")]
    SystemControl,
    #[serde(rename = "Network Security")]
    NetworkSecurity,
    #[serde(rename = "File Permissions")]
    FilePermissions,
    #[serde(rename = "Data Destruction")]
    DataDestruction,
    #[serde(rename = "Resource Exhaustion")]
    ResourceExhaustion,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::FileSystemDestruction => "File System Destruction",
            Category::DiskOperations => "Disk Operations",
            Category::SystemControl => "System Control",
            Category::NetworkSecurity => "Network Security",
            Category::FilePermissions => "File Permissions",
            Category::DataDestruction => "Data Destruction",
            Category::ResourceExhaustion => "Resource Exhaustion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uncompiled rule as it appears in the catalog table.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    /// Case-insensitive, unanchored regular expression.
    pub pattern: &'static str,
    pub risk_level: RiskLevel,
    pub description: &'static str,
    pub category: Category,
    /// Illustrative commands. Reporting only, never evaluated.
    pub examples: &'static [&'static str],
}

/// A catalog rule together with its compiled matcher.
#[derive(Debug, Clone)]
pub struct DangerousPattern {
    rule: PatternRule,
    regex: Regex,
}

impl DangerousPattern {
    pub fn compile(rule: PatternRule) -> Result<Self, SafetyError> {
        let regex = RegexBuilder::new(rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| SafetyError::InvalidPattern {
                pattern: rule.pattern.to_string(),
                source,
            })?;
        Ok(Self { rule, regex })
    }

    pub fn pattern(&self) -> &'static str {
        self.rule.pattern
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.rule.risk_level
    }

    pub fn description(&self) -> &'static str {
        self.rule.description
    }

    pub fn category(&self) -> Category {
        self.rule.category
    }

    pub fn examples(&self) -> &'static [&'static str] {
        self.rule.examples
    }

    /// Substring search, not a full match.
    pub fn is_match(&self, cmd: &str) -> bool {
        self.regex.is_match(cmd)
    }
}

/// Read-only store of compiled dangerous rules and allowlist carve-outs.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    patterns: Vec<DangerousPattern>,
    allowlist: Allowlist,
}

impl PatternRegistry {
    /// Compile the built-in catalog.
    pub fn builtin() -> Result<Self, SafetyError> {
        Self::with_allowlist(BUILTIN_RULES, Allowlist::builtin()?)
    }

    /// Compile an arbitrary catalog. Fails on the first malformed expression,
    /// so a registry is either complete or not built at all.
    pub fn from_rules(
        rules: &[PatternRule],
        allowlist: &[&'static str],
    ) -> Result<Self, SafetyError> {
        Self::with_allowlist(rules, Allowlist::new(allowlist)?)
    }

    fn with_allowlist(rules: &[PatternRule], allowlist: Allowlist) -> Result<Self, SafetyError> {
        let patterns = rules
            .iter()
            .copied()
            .map(DangerousPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            patterns = patterns.len(),
            allowlist = allowlist.patterns().len(),
            "Pattern registry compiled"
        );

        Ok(Self {
            patterns,
            allowlist,
        })
    }

    /// All dangerous rules, in catalog order.
    pub fn patterns(&self) -> &[DangerousPattern] {
        &self.patterns
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The built-in catalog, grouped by category.
pub const BUILTIN_RULES: &[PatternRule] = &[
    // File System Destruction
    PatternRule {
        pattern: r"\brm\s+(-[rfRF]*\s+)*(/|~|\$HOME|\.\.)",
        risk_level: RiskLevel::Critical,
        description: "Recursive file deletion targeting system or user directories",
        category: Category::FileSystemDestruction,
        examples: &["rm -rf /", "rm -rf ~", "rm -rf /home", "rm -rf ../"],
    },
    PatternRule {
        pattern: r"\brm\s+(-[rfRF]*\s+)*/\w*",
        risk_level: RiskLevel::High,
        description: "File deletion in root directory",
        category: Category::FileSystemDestruction,
        examples: &["rm -rf /bin", "rm -rf /usr", "rm -rf /etc"],
    },
    PatternRule {
        pattern: r"\brmdir\s+(-[rfRF]*\s+)*(/|~)",
        risk_level: RiskLevel::High,
        description: "Directory removal targeting system directories",
        category: Category::FileSystemDestruction,
        examples: &["rmdir -rf /", "rmdir ~/"],
    },
    // Disk Operations
    PatternRule {
        pattern: r"\bmkfs\.",
        risk_level: RiskLevel::Critical,
        description: "File system formatting (destroys all data on disk)",
        category: Category::DiskOperations,
        examples: &["mkfs.ext4 /dev/sda1", "mkfs.xfs /dev/sdb"],
    },
    PatternRule {
        pattern: r">\s*/dev/sd[a-z]\d*",
        risk_level: RiskLevel::Critical,
        description: "Direct write to disk device (data destruction)",
        category: Category::DiskOperations,
        examples: &["> /dev/sda", "echo 'data' > /dev/sdb1"],
    },
    PatternRule {
        pattern: r"\bdd\s+.*of=/dev/sd[a-z]",
        risk_level: RiskLevel::Critical,
        description: "Direct disk writing with dd command",
        category: Category::DiskOperations,
        examples: &["dd if=/dev/zero of=/dev/sda", "dd if=image.iso of=/dev/sdb"],
    },
    PatternRule {
        pattern: r"\bfdisk\s+(-\S+\s+)*/dev/sd[a-z]",
        risk_level: RiskLevel::High,
        description: "Disk partitioning operations",
        category: Category::DiskOperations,
        examples: &["fdisk /dev/sda", "fdisk -l /dev/sdb"],
    },
    // System Control
    PatternRule {
        pattern: r"\b(shutdown|poweroff|reboot|halt)\b",
        risk_level: RiskLevel::Medium,
        description: "System shutdown/restart commands",
        category: Category::SystemControl,
        examples: &["shutdown -h now", "reboot", "poweroff"],
    },
    PatternRule {
        pattern: r"\bkillall\s+(-9\s+)*\w",
        risk_level: RiskLevel::Medium,
        description: "Mass process termination",
        category: Category::SystemControl,
        examples: &["killall -9 python", "killall chrome"],
    },
    PatternRule {
        pattern: r"\bkill\s+(-9\s+)*1\b",
        risk_level: RiskLevel::Critical,
        description: "Killing init process (system crash)",
        category: Category::SystemControl,
        examples: &["kill -9 1", "kill 1"],
    },
    // Network Security
    PatternRule {
        pattern: r"\biptables\s+(-F|-X|--flush)",
        risk_level: RiskLevel::High,
        description: "Firewall rules deletion",
        category: Category::NetworkSecurity,
        examples: &["iptables -F", "iptables --flush"],
    },
    // File Permissions
    PatternRule {
        pattern: r"\bchmod\s+(777|666)\s+(/|~|\$HOME)",
        risk_level: RiskLevel::High,
        description: "Dangerous permission changes on system directories",
        category: Category::FilePermissions,
        examples: &["chmod 777 /", "chmod 666 ~/"],
    },
    PatternRule {
        pattern: r"\bchown\s+(.*:\s*|(-\S+\s+)*\S+\s+)(/|~|\$HOME)",
        risk_level: RiskLevel::High,
        description: "Ownership changes on system directories",
        category: Category::FilePermissions,
        examples: &["chown user: /", "chown nobody ~/"],
    },
    // Data Destruction
    PatternRule {
        pattern: r":\s*>\s*[\w~./$]",
        risk_level: RiskLevel::Medium,
        description: "File content destruction (shell redirect)",
        category: Category::DataDestruction,
        examples: &[": > important.txt", ": > ~/.bashrc"],
    },
    PatternRule {
        pattern: r"\bfind\s+.*-delete",
        risk_level: RiskLevel::High,
        description: "Mass file deletion with find",
        category: Category::DataDestruction,
        examples: &["find / -name '*.txt' -delete", "find ~ -type f -delete"],
    },
    // Resource Exhaustion
    PatternRule {
        pattern: r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
        risk_level: RiskLevel::Critical,
        description: "Fork bomb (system crash)",
        category: Category::ResourceExhaustion,
        examples: &[":(){ :|:& };:"],
    },
    PatternRule {
        pattern: r"\byes\s+.*\s*>\s*/dev/sd[a-z]",
        risk_level: RiskLevel::Critical,
        description: "Disk space exhaustion attack",
        category: Category::ResourceExhaustion,
        examples: &["yes 'data' > /dev/sda1"],
    },
];
