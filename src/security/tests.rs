//! End-to-end scenarios for the safety engine.

use crate::security::{
    Allowance, Category, Denial, Outcome, PromptKind, RiskLevel, SafetyEngine, ScriptedOperator,
};

fn engine() -> SafetyEngine {
    SafetyEngine::new().unwrap()
}

#[test]
fn test_ls_is_safe() {
    let engine = engine();
    let report = engine.analyze_command_risks("ls -la");
    assert!(!report.is_dangerous);
    assert_eq!(report.risk_level, RiskLevel::Low);

    let mut op = ScriptedOperator::default();
    assert!(engine.check_command_safety("ls -la", false, &mut op));
    assert!(op.prompts().is_empty());
}

#[test]
fn test_rm_root_full_ritual() {
    let engine = engine();
    let report = engine.analyze_command_risks("rm -rf /");
    assert!(report.is_dangerous);
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert!(report
        .matches
        .iter()
        .all(|m| m.category == Category::FileSystemDestruction));

    let mut op = ScriptedOperator::new(["rm -rf /", "I UNDERSTAND THE RISKS"]);
    assert!(engine.check_command_safety("rm -rf /", false, &mut op));
    assert_eq!(op.notices(), &["threats", "confirmed"]);
}

#[test]
fn test_rm_root_denied_without_retype() {
    let engine = engine();
    // the right phrase alone is not enough
    let mut op = ScriptedOperator::new([
        "I UNDERSTAND THE RISKS",
        "I UNDERSTAND THE RISKS",
        "I UNDERSTAND THE RISKS",
    ]);
    assert_eq!(
        engine.evaluate("rm -rf /", false, &mut op),
        Outcome::Denied(Denial::AttemptsExhausted)
    );
    assert!(
        op.prompts()
            .iter()
            .all(|p| matches!(p, PromptKind::Retype { .. }))
    );
}

#[test]
fn test_shutdown_yes_no() {
    let engine = engine();
    let report = engine.analyze_command_risks("shutdown -h now");
    assert!(report.is_dangerous);
    assert_eq!(report.risk_level, RiskLevel::Medium);

    let mut op = ScriptedOperator::new(["n"]);
    assert!(!engine.check_command_safety("shutdown -h now", false, &mut op));

    let mut op = ScriptedOperator::new(["Y"]);
    assert!(engine.check_command_safety("shutdown -h now", false, &mut op));
    assert_eq!(op.prompts(), &[PromptKind::YesNo]);
}

#[test]
fn test_find_delete_needs_phrase() {
    let engine = engine();
    let cmd = "find /tmp -name '*.log' -delete";
    let report = engine.analyze_command_risks(cmd);
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.matches[0].category, Category::DataDestruction);

    let mut op = ScriptedOperator::new(["y"]);
    assert!(!engine.check_command_safety(cmd, false, &mut op));

    let mut op = ScriptedOperator::new(["YES I UNDERSTAND"]);
    assert!(engine.check_command_safety(cmd, false, &mut op));
    assert_eq!(op.prompts(), &[PromptKind::Phrase]);
}

#[test]
fn test_tmp_cleanup_is_allowlisted() {
    let engine = engine();
    let report = engine.analyze_command_risks("rm -rf /tmp/build");
    assert!(!report.is_dangerous);
    assert!(report.matches.is_empty());

    let mut op = ScriptedOperator::default();
    assert_eq!(
        engine.evaluate("rm -rf /tmp/build", false, &mut op),
        Outcome::Allowed(Allowance::NotDangerous)
    );
    assert!(op.prompts().is_empty());
}

#[test]
fn test_fork_bomb() {
    let engine = engine();
    let report = engine.analyze_command_risks(":(){ :|:& };:");
    assert!(report.is_dangerous);
    assert!(!report.matches.is_empty());
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert_eq!(report.matches[0].category, Category::ResourceExhaustion);
}

#[test]
fn test_max_risk_is_highest_match() {
    let engine = engine();
    for cmd in [
        "sudo rm -rf / && reboot",
        "find / -delete; shutdown now",
        "dd if=/dev/zero of=/dev/sda && killall -9 sshd",
    ] {
        let report = engine.analyze_command_risks(cmd);
        assert!(!report.matches.is_empty());
        let highest = report.matches.iter().map(|m| m.risk_level).max();
        assert_eq!(Some(report.risk_level), highest, "{}", cmd);
    }
}

#[test]
fn test_confirm_once_then_cached_then_forced() {
    let engine = engine();
    let cmd = "iptables -F";

    let mut op = ScriptedOperator::new(["YES I UNDERSTAND"]);
    assert!(engine.check_command_safety(cmd, false, &mut op));

    let mut op = ScriptedOperator::default();
    assert!(engine.check_command_safety(cmd, false, &mut op));
    assert!(op.prompts().is_empty());

    let mut op = ScriptedOperator::default();
    assert_eq!(
        engine.evaluate(cmd, true, &mut op),
        Outcome::Denied(Denial::Aborted)
    );
    assert_eq!(op.prompts(), &[PromptKind::Phrase]);
}

#[test]
fn test_critical_cached_after_confirmation() {
    let engine = engine();
    let mut op = ScriptedOperator::new(["kill -9 1", "I UNDERSTAND THE RISKS"]);
    assert!(engine.check_command_safety("kill -9 1", false, &mut op));

    let mut op = ScriptedOperator::default();
    assert_eq!(
        engine.evaluate("kill -9 1", false, &mut op),
        Outcome::Allowed(Allowance::PreviouslyConfirmed)
    );
    assert_eq!(engine.safety_report().confirmed_commands_count, 1);
}
