//! Main entry point for the rusty-guard command line tool.
//!
//! A thin adapter over the library: it loads the configuration, builds one
//! `SafetyEngine`, dispatches a subcommand and maps the verdict to an exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rusty_guard::security::{self, default_config_path, ConsoleOperator, SafetyConfig, SafetyEngine};
use rusty_guard::utils;

#[derive(Debug, Parser)]
#[command(name = "rusty-guard", version, about = "Dangerous command detection for AI-generated shell commands")]
struct Cli {
    /// Path to a JSON safety config (defaults to ~/.rusty-guard/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a command without prompting
    Check {
        command: String,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the full confirmation ritual; exits non-zero when denied
    Confirm {
        command: String,
        /// Ignore earlier confirmations in this session
        #[arg(long)]
        force: bool,
    },
    /// Show catalog statistics
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Classify a fixed sample set and verify the results
    SelfTest,
}

fn main() -> Result<ExitCode> {
    // --help, --version and usage errors exit here, before any log file exists
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = utils::logger::init_logging(&utils::logger::default_log_dir());

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = SafetyConfig::load_or_default(&config_path)?;
    let engine = SafetyEngine::with_config(config).context("Failed to initialize safety engine")?;

    run(&engine, cli.command)
}

fn run(engine: &SafetyEngine, command: Command) -> Result<ExitCode> {
    match command {
        Command::Check { command, json } => {
            let analysis = engine.analyze_command_risks(&command);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(ExitCode::SUCCESS);
            }

            if analysis.is_dangerous {
                println!("⚠️  DANGEROUS COMMAND DETECTED");
                println!("Command: {}", command);
                println!("Risk Level: {}", analysis.risk_level);
                println!("\nDetected threats:");
                for m in &analysis.matches {
                    println!("  • {}: {}", m.category, m.description);
                    println!("    Risk: {}", m.risk_level);
                    let examples: Vec<&str> = m.examples.iter().take(2).map(String::as_str).collect();
                    println!("    Examples: {}", examples.join(", "));
                    println!();
                }
            } else {
                println!("✅ SAFE COMMAND");
                println!("Command: {}", command);
                println!("No dangerous patterns detected.");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Confirm { command, force } => {
            let mut operator = ConsoleOperator::stdio();
            if engine.check_command_safety(&command, force, &mut operator) {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("❌ Dangerous command blocked for safety: {}", command);
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Report { json } => {
            let report = engine.safety_report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
                println!("🔒 Security Status: ACTIVE");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::SelfTest => {
            let report = security::self_test(engine);
            println!("{}", report);
            if report.all_passed() {
                println!("🎉 All tests passed! Security system is functioning correctly.");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("⚠️  Some tests failed. Security system may need attention.");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
