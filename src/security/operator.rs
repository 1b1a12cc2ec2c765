//! Operator interaction for the confirmation ritual.
//!
//! The protocol never touches the terminal directly. It talks to an
//! [`Operator`], which is either the real console or a scripted stand-in.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crossterm::style::{StyledContent, Stylize};

use super::analyzer::RiskAnalysis;
use super::patterns::RiskLevel;
use super::Denial;

/// Which question the operator is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `y`/`yes` confirms, anything else denies.
    YesNo,
    /// Exact acknowledgment phrase.
    Phrase,
    /// Retype the command byte for byte.
    Retype { attempt: u32, max_attempts: u32 },
    /// Acknowledgment phrase after a correct retype.
    FinalPhrase,
}

#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub tier: RiskLevel,
    pub kind: PromptKind,
    pub command: &'a str,
    /// Expected literal for phrase prompts.
    pub phrase: Option<&'a str>,
}

/// Informational output that needs no answer.
#[derive(Debug, Clone, Copy)]
pub enum Notice<'a> {
    Threats {
        command: &'a str,
        analysis: &'a RiskAnalysis<'a>,
    },
    PreviouslyConfirmed,
    Mismatch { remaining: u32 },
    Confirmed { tier: RiskLevel },
    Blocked { denial: &'a Denial },
}

impl Notice<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Notice::Threats { .. } => "threats",
            Notice::PreviouslyConfirmed => "previously-confirmed",
            Notice::Mismatch { .. } => "mismatch",
            Notice::Confirmed { .. } => "confirmed",
            Notice::Blocked { .. } => "blocked",
        }
    }
}

pub trait Operator {
    fn notify(&mut self, notice: &Notice<'_>);

    /// Ask a question. `Ok(None)` means the operator closed the input
    /// (EOF or interrupt), which the protocol treats as a denial.
    fn ask(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>>;
}

/// Interactive operator over a reader/writer pair.
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn render_notice(&mut self, notice: &Notice<'_>) -> io::Result<()> {
        let out = &mut self.output;
        match notice {
            Notice::Threats { command, analysis } => {
                writeln!(out, "{}", " DANGEROUS COMMAND DETECTED ".white().on_red().bold())?;
                writeln!(out, "{}", format!("Command: {}", command).red().bold())?;
                writeln!(out, "{}", "⚠️  Detected Threats:".yellow())?;
                for m in &analysis.matches {
                    writeln!(out, "  • {}: {}", m.category().as_str().red(), m.description())?;
                    writeln!(out, "    Risk Level: {}", styled_level(m.risk_level()))?;
                }
            }
            Notice::PreviouslyConfirmed => {
                writeln!(
                    out,
                    "{}",
                    "✅ Previously confirmed dangerous command. Proceeding...".green()
                )?;
            }
            Notice::Mismatch { remaining } => {
                writeln!(
                    out,
                    "{}",
                    format!("❌ Command doesn't match. {} attempts remaining.", remaining).red()
                )?;
            }
            Notice::Confirmed { tier } => {
                let line = match tier {
                    RiskLevel::Critical => "⚠️  Command confirmed. Proceeding with EXTREME CAUTION...",
                    RiskLevel::High => "⚠️  Command confirmed. Proceeding with caution...",
                    _ => "✅ Command confirmed.",
                };
                writeln!(out, "{}", line.green())?;
            }
            Notice::Blocked { denial } => {
                let line = match denial {
                    Denial::AttemptsExhausted => "❌ Max attempts reached. Command blocked for safety.",
                    Denial::PhraseMismatch => "❌ Final confirmation failed. Command blocked for safety.",
                    Denial::Declined => "❌ Command cancelled for safety.",
                    Denial::Aborted => "❌ Input closed. Command blocked for safety.",
                    Denial::Fault(_) => "❌ Safety check failed. Command blocked for safety.",
                };
                writeln!(out, "{}", line.yellow())?;
            }
        }
        out.flush()
    }

    fn render_prompt(&mut self, prompt: &Prompt<'_>) -> io::Result<()> {
        let out = &mut self.output;
        let phrase = prompt.phrase.unwrap_or_default();
        match prompt.kind {
            PromptKind::YesNo => {
                writeln!(out, "{}", "⚠️  Potentially dangerous command detected.".yellow())?;
                write!(
                    out,
                    "{}",
                    "Are you sure you want to execute this command? (y/N): ".yellow()
                )?;
            }
            PromptKind::Phrase => {
                writeln!(out, "{}", "⚠️  HIGH RISK COMMAND DETECTED!".red().bold())?;
                writeln!(
                    out,
                    "{}",
                    "This command could cause significant damage or data loss.".yellow()
                )?;
                write!(
                    out,
                    "{}",
                    format!(
                        "Do you understand the risks and want to proceed? Type '{}': ",
                        phrase
                    )
                    .yellow()
                )?;
            }
            PromptKind::Retype {
                attempt,
                max_attempts,
            } => {
                if attempt == 1 {
                    writeln!(out, "{}", "🚨 CRITICAL RISK COMMAND DETECTED! 🚨".red().bold())?;
                    writeln!(
                        out,
                        "{}",
                        "This command could cause IRREVERSIBLE DATA LOSS or SYSTEM DAMAGE!".red()
                    )?;
                    writeln!(out, "{}", "To proceed, you must type the EXACT command:".yellow())?;
                    writeln!(out, "{}", format!("Expected: {}", prompt.command).cyan())?;
                }
                write!(
                    out,
                    "{}",
                    format!(
                        "Type command exactly (attempt {}/{}): ",
                        attempt, max_attempts
                    )
                    .red()
                )?;
            }
            PromptKind::FinalPhrase => {
                write!(
                    out,
                    "{}",
                    format!("Are you ABSOLUTELY SURE? Type '{}': ", phrase).red()
                )?;
            }
        }
        out.flush()
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn notify(&mut self, notice: &Notice<'_>) {
        if let Err(e) = self.render_notice(notice) {
            tracing::warn!("Failed to write notice to console: {}", e);
        }
    }

    fn ask(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        self.render_prompt(prompt)?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn styled_level(level: RiskLevel) -> StyledContent<&'static str> {
    match level {
        RiskLevel::Low => level.as_str().green(),
        RiskLevel::Medium => level.as_str().yellow(),
        RiskLevel::High => level.as_str().red(),
        RiskLevel::Critical => level.as_str().red().bold(),
    }
}

/// Replays canned answers and records what it was shown.
///
/// When the script runs out it behaves like a closed input.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    responses: VecDeque<String>,
    prompts: Vec<PromptKind>,
    notices: Vec<&'static str>,
}

impl ScriptedOperator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Prompts asked so far, in order.
    pub fn prompts(&self) -> &[PromptKind] {
        &self.prompts
    }

    /// Labels of notices shown so far, in order.
    pub fn notices(&self) -> &[&'static str] {
        &self.notices
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Operator for ScriptedOperator {
    fn notify(&mut self, notice: &Notice<'_>) {
        self.notices.push(notice.label());
    }

    fn ask(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        self.prompts.push(prompt.kind);
        Ok(self.responses.pop_front())
    }
}
