//! Command safety gate.
//!
//! [`SafetyEngine`] is the single entrypoint that turns a candidate command
//! into an allow/deny decision. It owns the compiled catalog, the session
//! confirmation cache and the ritual settings. Build one at startup and pass
//! it to whatever needs it.

use std::panic::{self, AssertUnwindSafe};

use super::analyzer::{analyze_command, CommandRiskReport, RiskAnalysis};
use super::cache::{ConfirmationCache, Fingerprint};
use super::config::SafetyConfig;
use super::confirm::confirm_command;
use super::error::SafetyError;
use super::operator::{Notice, Operator};
use super::patterns::PatternRegistry;
use super::report::SafetyReport;
use super::{Allowance, Denial, Outcome};

#[derive(Debug)]
pub struct SafetyEngine {
    registry: PatternRegistry,
    cache: ConfirmationCache,
    config: SafetyConfig,
}

/// A command stopped by [`SafetyEngine::gate_commands`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedCommand {
    pub command: String,
    pub denial: Denial,
}

/// Result of gating a batch of commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResult {
    /// Commands that went through the gate, including the blocked one.
    pub checked: usize,
    pub blocked: Option<BlockedCommand>,
}

impl GateResult {
    pub fn all_passed(&self) -> bool {
        self.blocked.is_none()
    }
}

impl SafetyEngine {
    /// Engine with the built-in catalog and default settings.
    pub fn new() -> Result<Self, SafetyError> {
        Self::with_config(SafetyConfig::default())
    }

    pub fn with_config(config: SafetyConfig) -> Result<Self, SafetyError> {
        Self::from_parts(PatternRegistry::builtin()?, config)
    }

    pub fn from_parts(registry: PatternRegistry, config: SafetyConfig) -> Result<Self, SafetyError> {
        config.validate()?;
        tracing::info!(
            patterns = registry.len(),
            max_retype_attempts = config.max_retype_attempts,
            "Safety engine initialized"
        );
        Ok(Self {
            registry,
            cache: ConfirmationCache::new(),
            config,
        })
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ConfirmationCache {
        &self.cache
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    pub fn fingerprint(&self, command: &str) -> Fingerprint {
        Fingerprint::of(command, self.config.fingerprint_len)
    }

    /// Pure classification. No prompts, no cache access.
    pub fn analyze(&self, command: &str) -> RiskAnalysis<'_> {
        analyze_command(&self.registry, command)
    }

    /// Owned, serializable view of [`SafetyEngine::analyze`].
    pub fn analyze_command_risks(&self, command: &str) -> CommandRiskReport {
        CommandRiskReport::from(&self.analyze(command))
    }

    pub fn safety_report(&self) -> SafetyReport {
        SafetyReport::collect(&self.registry, &self.cache)
    }

    /// Check a command and ask the operator when it is dangerous.
    ///
    /// Returns `true` only when the command may run. Any fault along the way
    /// denies the command.
    ///
    /// # Examples
    /// ```
    /// use rusty_guard::security::{SafetyEngine, ScriptedOperator};
    ///
    /// let engine = SafetyEngine::new().unwrap();
    ///
    /// // Safe command - no questions asked
    /// let mut operator = ScriptedOperator::default();
    /// assert!(engine.check_command_safety("ls -la", false, &mut operator));
    /// assert!(operator.prompts().is_empty());
    ///
    /// // Medium risk - a plain "y" is enough
    /// let mut operator = ScriptedOperator::new(["y"]);
    /// assert!(engine.check_command_safety("shutdown -h now", false, &mut operator));
    ///
    /// // Critical risk - declining the retype blocks it
    /// let mut operator = ScriptedOperator::new(["no", "no", "no"]);
    /// assert!(!engine.check_command_safety("rm -rf /", false, &mut operator));
    /// ```
    pub fn check_command_safety(
        &self,
        command: &str,
        force_confirm: bool,
        operator: &mut dyn Operator,
    ) -> bool {
        self.evaluate(command, force_confirm, operator).is_allowed()
    }

    /// Like [`SafetyEngine::check_command_safety`], but reports how the
    /// decision was reached.
    pub fn evaluate(
        &self,
        command: &str,
        force_confirm: bool,
        operator: &mut dyn Operator,
    ) -> Outcome {
        if command.trim().is_empty() {
            return Outcome::Allowed(Allowance::Empty);
        }

        let analysis = self.analyze(command);
        if !analysis.is_dangerous {
            return Outcome::Allowed(Allowance::NotDangerous);
        }

        let fingerprint = self.fingerprint(command);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_protocol(command, &analysis, &fingerprint, force_confirm, operator)
        }));

        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::warn!(%fingerprint, "Safety check failed, denying: {}", e);
                Outcome::Denied(Denial::Fault(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(%fingerprint, "Confirmation panicked, denying");
                Outcome::Denied(Denial::Fault("confirmation panicked".to_string()))
            }
        };

        match &outcome {
            Outcome::Allowed(Allowance::Confirmed) => {
                tracing::info!(%fingerprint, risk = %analysis.max_risk, "Dangerous command confirmed");
                self.cache.record(fingerprint);
            }
            Outcome::Allowed(_) => {}
            Outcome::Denied(denial) => {
                tracing::warn!(
                    %fingerprint,
                    risk = %analysis.max_risk,
                    categories = ?analysis.categories(),
                    ?denial,
                    "Dangerous command denied"
                );
            }
        }
        outcome
    }

    fn run_protocol(
        &self,
        command: &str,
        analysis: &RiskAnalysis<'_>,
        fingerprint: &Fingerprint,
        force_confirm: bool,
        operator: &mut dyn Operator,
    ) -> Result<Outcome, SafetyError> {
        if !force_confirm && self.cache.lookup(fingerprint) == Some(true) {
            tracing::info!(%fingerprint, "Previously confirmed command, skipping prompt");
            operator.notify(&Notice::PreviouslyConfirmed);
            return Ok(Outcome::Allowed(Allowance::PreviouslyConfirmed));
        }

        operator.notify(&Notice::Threats { command, analysis });
        confirm_command(operator, command, analysis.max_risk, &self.config)
    }

    /// Gate every command extracted from one model response, in order.
    /// Stops at the first denied command.
    pub fn gate_commands<I, S>(&self, commands: I, operator: &mut dyn Operator) -> GateResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut checked = 0;
        for command in commands {
            let command = command.as_ref().trim();
            checked += 1;
            if let Outcome::Denied(denial) = self.evaluate(command, false, operator) {
                return GateResult {
                    checked,
                    blocked: Some(BlockedCommand {
                        command: command.to_string(),
                        denial,
                    }),
                };
            }
        }
        GateResult {
            checked,
            blocked: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::operator::{Prompt, ScriptedOperator};
    use std::io;

    fn engine() -> SafetyEngine {
        SafetyEngine::new().unwrap()
    }

    #[test]
    fn test_empty_command_allowed() {
        let engine = engine();
        let mut op = ScriptedOperator::default();
        assert_eq!(engine.evaluate("", false, &mut op), Outcome::Allowed(Allowance::Empty));
        assert_eq!(engine.evaluate("   \t", true, &mut op), Outcome::Allowed(Allowance::Empty));
        assert!(op.prompts().is_empty());
    }

    #[test]
    fn test_safe_command_allowed_silently() {
        let engine = engine();
        let mut op = ScriptedOperator::default();
        assert_eq!(
            engine.evaluate("ls -la", false, &mut op),
            Outcome::Allowed(Allowance::NotDangerous)
        );
        assert!(op.notices().is_empty());
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_confirmation_is_cached() {
        let engine = engine();

        let mut op = ScriptedOperator::new(["yes"]);
        assert!(engine.check_command_safety("reboot", false, &mut op));
        assert_eq!(engine.cache().len(), 1);

        let mut op = ScriptedOperator::default();
        assert_eq!(
            engine.evaluate("reboot", false, &mut op),
            Outcome::Allowed(Allowance::PreviouslyConfirmed)
        );
        assert!(op.prompts().is_empty());
        assert_eq!(op.notices(), &["previously-confirmed"]);
    }

    #[test]
    fn test_denial_is_not_cached() {
        let engine = engine();
        let mut op = ScriptedOperator::new(["n"]);
        assert!(!engine.check_command_safety("reboot", false, &mut op));
        assert!(engine.cache().is_empty());

        // asked again
        let mut op = ScriptedOperator::new(["n"]);
        assert!(!engine.check_command_safety("reboot", false, &mut op));
        assert_eq!(op.prompts().len(), 1);
    }

    #[test]
    fn test_force_confirm_bypasses_cache() {
        let engine = engine();
        let mut op = ScriptedOperator::new(["y"]);
        assert!(engine.check_command_safety("reboot", false, &mut op));

        let mut op = ScriptedOperator::new(["n"]);
        assert!(!engine.check_command_safety("reboot", true, &mut op));
        assert_eq!(op.prompts().len(), 1);

        // the earlier confirmation is still there
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_cache_is_per_exact_string() {
        let engine = engine();
        let mut op = ScriptedOperator::new(["y"]);
        assert!(engine.check_command_safety("reboot", false, &mut op));

        let mut op = ScriptedOperator::new(["n"]);
        assert!(!engine.check_command_safety("reboot now", false, &mut op));
        assert_eq!(op.prompts().len(), 1);
    }

    struct PanickingOperator;

    impl Operator for PanickingOperator {
        fn notify(&mut self, _notice: &Notice<'_>) {}

        fn ask(&mut self, _prompt: &Prompt<'_>) -> io::Result<Option<String>> {
            panic!("operator exploded");
        }
    }

    struct FailingOperator;

    impl Operator for FailingOperator {
        fn notify(&mut self, _notice: &Notice<'_>) {}

        fn ask(&mut self, _prompt: &Prompt<'_>) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::Other, "unreadable input"))
        }
    }

    #[test]
    fn test_operator_failure_fails_closed() {
        let engine = engine();
        let outcome = engine.evaluate("shutdown now", false, &mut FailingOperator);
        assert!(matches!(outcome, Outcome::Denied(Denial::Fault(_))));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_operator_panic_fails_closed() {
        let engine = engine();
        let outcome = engine.evaluate("rm -rf /", false, &mut PanickingOperator);
        assert!(matches!(outcome, Outcome::Denied(Denial::Fault(_))));
    }

    #[test]
    fn test_invalid_config_refuses_to_build() {
        let config = SafetyConfig {
            max_retype_attempts: 0,
            ..SafetyConfig::default()
        };
        assert!(matches!(
            SafetyEngine::with_config(config),
            Err(SafetyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_gate_stops_at_first_denial() {
        let engine = engine();
        let mut op = ScriptedOperator::new(["n"]);
        let result = engine.gate_commands(
            ["ls -la", "shutdown -h now", "rm -rf /"],
            &mut op,
        );
        assert!(!result.all_passed());
        assert_eq!(result.checked, 2);
        assert_eq!(
            result.blocked,
            Some(BlockedCommand {
                command: "shutdown -h now".to_string(),
                denial: Denial::Declined,
            })
        );
    }

    #[test]
    fn test_gate_all_pass() {
        let engine = engine();
        let mut op = ScriptedOperator::new(["yes"]);
        let commands = vec![
            "cargo build".to_string(),
            "  reboot  ".to_string(),
            "rm -rf /tmp/build".to_string(),
        ];
        let result = engine.gate_commands(&commands, &mut op);
        assert!(result.all_passed());
        assert_eq!(result.checked, 3);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SafetyEngine>();
    }
}
