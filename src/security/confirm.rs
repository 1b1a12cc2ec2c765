//! Tiered confirmation ritual.
//!
//! The burden on the operator grows with the risk level:
//!
//! | tier     | ritual                                             |
//! |----------|----------------------------------------------------|
//! | LOW      | none                                               |
//! | MEDIUM   | `y`/`yes`                                          |
//! | HIGH     | exact acknowledgment phrase                        |
//! | CRITICAL | retype the command (bounded attempts), then phrase |
//!
//! Only the CRITICAL tier retries. Every other tier is single-shot.
//! Answers are trimmed, the command being retyped is not.

use super::config::SafetyConfig;
use super::error::SafetyError;
use super::operator::{Notice, Operator, Prompt, PromptKind};
use super::patterns::RiskLevel;
use super::{Allowance, Denial, Outcome};

/// Run the ritual for `tier`. I/O failures surface as errors so the caller
/// can fail closed.
pub fn confirm_command(
    operator: &mut dyn Operator,
    command: &str,
    tier: RiskLevel,
    config: &SafetyConfig,
) -> Result<Outcome, SafetyError> {
    let outcome = match tier {
        RiskLevel::Low => return Ok(Outcome::Allowed(Allowance::LowRisk)),
        RiskLevel::Medium => confirm_yes_no(operator, command)?,
        RiskLevel::High => confirm_phrase(operator, command, &config.high_risk_phrase)?,
        RiskLevel::Critical => confirm_critical(operator, command, config)?,
    };

    match &outcome {
        Outcome::Allowed(_) => operator.notify(&Notice::Confirmed { tier }),
        Outcome::Denied(denial) => operator.notify(&Notice::Blocked { denial }),
    }
    Ok(outcome)
}

fn confirm_yes_no(operator: &mut dyn Operator, command: &str) -> Result<Outcome, SafetyError> {
    let prompt = Prompt {
        tier: RiskLevel::Medium,
        kind: PromptKind::YesNo,
        command,
        phrase: None,
    };
    let Some(answer) = operator.ask(&prompt)? else {
        return Ok(Outcome::Denied(Denial::Aborted));
    };

    let answer = answer.trim().to_lowercase();
    if matches!(answer.as_str(), "y" | "yes") {
        Ok(Outcome::Allowed(Allowance::Confirmed))
    } else {
        Ok(Outcome::Denied(Denial::Declined))
    }
}

fn confirm_phrase(
    operator: &mut dyn Operator,
    command: &str,
    phrase: &str,
) -> Result<Outcome, SafetyError> {
    let prompt = Prompt {
        tier: RiskLevel::High,
        kind: PromptKind::Phrase,
        command,
        phrase: Some(phrase),
    };
    let Some(answer) = operator.ask(&prompt)? else {
        return Ok(Outcome::Denied(Denial::Aborted));
    };

    if answer.trim() == phrase {
        Ok(Outcome::Allowed(Allowance::Confirmed))
    } else {
        Ok(Outcome::Denied(Denial::PhraseMismatch))
    }
}

fn confirm_critical(
    operator: &mut dyn Operator,
    command: &str,
    config: &SafetyConfig,
) -> Result<Outcome, SafetyError> {
    let max_attempts = config.max_retype_attempts;

    for attempt in 1..=max_attempts {
        let prompt = Prompt {
            tier: RiskLevel::Critical,
            kind: PromptKind::Retype {
                attempt,
                max_attempts,
            },
            command,
            phrase: None,
        };
        let Some(retyped) = operator.ask(&prompt)? else {
            return Ok(Outcome::Denied(Denial::Aborted));
        };

        if retyped.trim() == command {
            let prompt = Prompt {
                tier: RiskLevel::Critical,
                kind: PromptKind::FinalPhrase,
                command,
                phrase: Some(config.critical_risk_phrase.as_str()),
            };
            let Some(answer) = operator.ask(&prompt)? else {
                return Ok(Outcome::Denied(Denial::Aborted));
            };
            return if answer.trim() == config.critical_risk_phrase {
                Ok(Outcome::Allowed(Allowance::Confirmed))
            } else {
                Ok(Outcome::Denied(Denial::PhraseMismatch))
            };
        }

        tracing::debug!(attempt, max_attempts, "Retyped command did not match");
        operator.notify(&Notice::Mismatch {
            remaining: max_attempts - attempt,
        });
    }

    Ok(Outcome::Denied(Denial::AttemptsExhausted))
}
