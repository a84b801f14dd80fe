mod config;

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use colored::Colorize;

use autoreflect_core::{
    ReflectionOutcome, ReflectionPaths, SessionTracker, TriggerEvaluator, TriggerThresholds,
};
use autoreflect_logging::{init_tracing, LogFormat, Logger, ReflectEvent};
use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "autoreflect",
    about = "Automatic reflection entries for troubled agent sessions",
    version,
    author
)]
struct Cli {
    /// Simulate a problematic session and report whether reflection triggered
    #[arg(long)]
    demo: bool,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output the outcome as JSON
    #[arg(long)]
    json_output: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let Some(cli) = parse_args(std::env::args_os())? else {
        return Ok(());
    };

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);
    let logger = Logger::new(log_format);

    let working_dir = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let paths = config.paths(&working_dir);

    if log_format == LogFormat::Pretty {
        eprintln!("{} Running auto-reflection demo...", "🧪".bright_blue());
    }

    let outcome = run_demo(paths, config.triggers, &logger)?;

    if cli.json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.is_reflected() {
        eprintln!();
        eprintln!("{} Demo complete - reflection was triggered", "✅".bright_green());
    } else {
        eprintln!();
        eprintln!(
            "{} Demo complete - no reflection triggered",
            "⚠".bright_yellow()
        );
    }

    Ok(())
}

/// Parse the command line. Anything other than a valid `--demo` invocation
/// prints usage and returns `None`.
fn parse_args<I, T>(args: I) -> Result<Option<Cli>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) if cli.demo => Ok(Some(cli)),
        Ok(_) => {
            print_usage()?;
            Ok(None)
        }
        Err(e) => {
            match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.print()?,
                _ => {
                    e.print()?;
                    print_usage()?;
                }
            }
            Ok(None)
        }
    }
}

fn print_usage() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

/// Simulate a session with several errors, one completed and one blocked feature.
fn run_demo(
    paths: ReflectionPaths,
    thresholds: TriggerThresholds,
    logger: &Logger,
) -> Result<ReflectionOutcome> {
    let mut tracker = SessionTracker::with_id("demo_session", paths)
        .with_evaluator(TriggerEvaluator::new(thresholds));

    logger.log(&ReflectEvent::SessionStarted {
        session_id: tracker.session_id().to_string(),
    });

    tracker.record_feature_attempt("feature_a");
    tracker.record_feature_attempt("feature_b");
    tracker.record_error("ModuleNotFoundError: No module named 'foo'");
    tracker.record_error("SyntaxError: unexpected indent");
    tracker.record_error("FileNotFoundError: config.yaml not found");
    tracker.record_error("TypeError: expected str, got int");
    tracker.record_error("ConnectionError: timeout after 30s");
    tracker.record_feature_complete("feature_a");
    tracker.record_blocked_feature("feature_b");

    let outcome = tracker
        .finalize()
        .context("Failed to finalize demo session")?;

    report(&outcome, logger);
    Ok(outcome)
}

fn report(outcome: &ReflectionOutcome, logger: &Logger) {
    let session_id = outcome.record().session_id.clone();

    logger.log(&ReflectEvent::TriggersEvaluated {
        session_id: session_id.clone(),
        fired: outcome.triggers().to_vec(),
    });

    match outcome {
        ReflectionOutcome::Reflected {
            label,
            triggers,
            log_path,
            memory_path,
            total_sessions,
            keywords_indexed,
            ..
        } => {
            logger.log(&ReflectEvent::ReflectionWritten {
                label: label.clone(),
                log_path: log_path.clone(),
                triggers: triggers.clone(),
            });
            logger.log(&ReflectEvent::MemoryUpdated {
                memory_path: memory_path.clone(),
                total_sessions: *total_sessions,
                keywords_indexed: *keywords_indexed,
            });
        }
        ReflectionOutcome::Skipped { .. } => {
            logger.log(&ReflectEvent::ReflectionSkipped { session_id });
        }
    }
}
