//! Confirmation ritual settings.
//!
//! Only the literals and the retry budget are configurable. The rule catalog
//! itself is fixed at build time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use super::cache::DEFAULT_FINGERPRINT_LEN;
use super::error::SafetyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Retype attempts granted for a CRITICAL command.
    pub max_retype_attempts: u32,
    /// Literal the operator must type for a HIGH command.
    pub high_risk_phrase: String,
    /// Literal required after a correct retype of a CRITICAL command.
    pub critical_risk_phrase: String,
    /// Hex characters kept from the command digest.
    pub fingerprint_len: usize,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_retype_attempts: 3,
            high_risk_phrase: "YES I UNDERSTAND".to_string(),
            critical_risk_phrase: "I UNDERSTAND THE RISKS".to_string(),
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
        }
    }
}

impl SafetyConfig {
    pub fn validate(&self) -> Result<(), SafetyError> {
        if self.max_retype_attempts == 0 {
            return Err(SafetyError::InvalidConfig(
                "max_retype_attempts must be at least 1".into(),
            ));
        }
        if self.high_risk_phrase.trim().is_empty() {
            return Err(SafetyError::InvalidConfig(
                "high_risk_phrase must not be empty".into(),
            ));
        }
        if self.critical_risk_phrase.trim().is_empty() {
            return Err(SafetyError::InvalidConfig(
                "critical_risk_phrase must not be empty".into(),
            ));
        }
        if !(8..=64).contains(&self.fingerprint_len) {
            return Err(SafetyError::InvalidConfig(format!(
                "fingerprint_len must be between 8 and 64, got {}",
                self.fingerprint_len
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: SafetyConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid safety config JSON at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Rejected safety config at {}", path.display()))?;
        Ok(config)
    }

    /// Like [`SafetyConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No safety config found, using defaults");
            Ok(Self::default())
        }
    }
}

/// `~/.rusty-guard/config.json`
pub fn default_config_path() -> PathBuf {
    home_dir().join("config.json")
}

/// `~/.rusty-guard`, falling back to the current directory without `HOME`.
pub fn home_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".rusty-guard")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The returned directory must outlive the path; dropping it removes the file.
    fn scratch_file(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SafetyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retype_attempts, 3);
        assert_eq!(config.high_risk_phrase, "YES I UNDERSTAND");
        assert_eq!(config.critical_risk_phrase, "I UNDERSTAND THE RISKS");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = SafetyConfig {
            max_retype_attempts: 0,
            ..SafetyConfig::default()
        };
        assert!(matches!(config.validate(), Err(SafetyError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_phrase_rejected() {
        let config = SafetyConfig {
            high_risk_phrase: "   ".into(),
            ..SafetyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fingerprint_len_bounds() {
        let short = SafetyConfig {
            fingerprint_len: 4,
            ..SafetyConfig::default()
        };
        assert!(short.validate().is_err());

        let long = SafetyConfig {
            fingerprint_len: 65,
            ..SafetyConfig::default()
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let (_dir, path) = scratch_file("partial.json", r#"{ "max_retype_attempts": 5 }"#);
        let config = SafetyConfig::load(&path).unwrap();
        assert_eq!(config.max_retype_attempts, 5);
        assert_eq!(config.high_risk_phrase, "YES I UNDERSTAND");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let (_dir, path) = scratch_file("invalid.json", r#"{ "max_retype_attempts": 0 }"#);
        let err = SafetyConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("max_retype_attempts"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let (_dir, path) = scratch_file("broken.json", "{ not json");
        assert!(SafetyConfig::load(&path).is_err());
    }

    #[test]
    fn test_scratch_files_are_removed() {
        let (dir, path) = scratch_file("gone.json", "{}");
        assert!(SafetyConfig::load(&path).is_ok());
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let config = SafetyConfig::load_or_default(&path).unwrap();
        assert_eq!(config, SafetyConfig::default());
    }
}
