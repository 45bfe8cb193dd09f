//! `daylog` command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `ActivityService` operations.
//! - Print results as JSON on stdout and errors on stderr.
//!
//! # Invariants
//! - The store location always comes from `--store` / `DAYLOG_STORE`.
//! - File diagnostics start only when `--log-dir` is given.
//! - `--log-level` is validated even when diagnostics stay off.

use clap::{Args, Parser, Subcommand};
use daylog_core::{
    init_logging, ActivityService, FileActivityLogRepository, LogLevel, LoggingConfig,
    ProgressReport, StoreConfig, DEFAULT_STORE_PATH,
};
use log::info;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "daylog", version, about = "Day-keyed AIM/PROGRESS activity log")]
struct Cli {
    /// Activity store file.
    #[arg(long, env = "DAYLOG_STORE", default_value = DEFAULT_STORE_PATH, global = true)]
    store: PathBuf,

    /// Absolute directory for diagnostic logs; diagnostics are off when unset.
    #[arg(long, env = "DAYLOG_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "DAYLOG_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record the AIM note that opens a day.
    StartDay {
        #[arg(long, allow_hyphen_values = true)]
        day: i64,
        note: String,
    },
    /// Record the PROGRESS outcome that closes a day.
    EndDay(EndDayArgs),
    /// Print the day inferred from the latest AIM entry.
    CurrentDay,
    /// Print every readable entry.
    Entries,
    /// Print the summary of one day.
    Summary {
        #[arg(long)]
        day: i64,
    },
    /// Print the cross-day report.
    Report,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::StartDay { .. } => "start-day",
            Self::EndDay(_) => "end-day",
            Self::CurrentDay => "current-day",
            Self::Entries => "entries",
            Self::Summary { .. } => "summary",
            Self::Report => "report",
        }
    }
}

#[derive(Debug, Args)]
struct EndDayArgs {
    /// Defaults to the day of the latest AIM entry.
    #[arg(long)]
    day: Option<i64>,

    /// Full progress object as JSON: {"done":[..],"failed":[..],"summary":".."}
    #[arg(long, conflicts_with_all = ["done", "failed", "summary"])]
    progress: Option<String>,

    #[arg(long)]
    done: Vec<String>,

    #[arg(long)]
    failed: Vec<String>,

    #[arg(long, required_unless_present = "progress")]
    summary: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("daylog: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let level = match &cli.log_level {
        Some(raw) => raw.parse::<LogLevel>()?,
        None => LogLevel::build_default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&LoggingConfig::new(level, log_dir))?;
    }
    info!(
        "event=cli_start module=cli status=ok command={} store={} version={}",
        cli.command.name(),
        cli.store.display(),
        daylog_core::core_version()
    );

    let service = ActivityService::open(&StoreConfig::new(&cli.store));
    let output = execute(&service, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute(
    service: &ActivityService<FileActivityLogRepository>,
    command: Command,
) -> Result<Value, Box<dyn Error>> {
    let output = match command {
        Command::StartDay { day, note } => {
            let entry = service.record_intent(&note, day)?;
            serde_json::json!({ "recorded": "AIM", "day": entry.day, "timestamp": entry.timestamp })
        }
        Command::EndDay(args) => {
            let entry = match args.progress {
                Some(raw) => {
                    let value: Value = serde_json::from_str(&raw)?;
                    service.record_outcome_json(&value, args.day)?
                }
                None => {
                    let report = ProgressReport::new(
                        args.done,
                        args.failed,
                        args.summary.unwrap_or_default(),
                    );
                    service.record_outcome(&report, args.day)?
                }
            };
            serde_json::json!({ "recorded": "PROGRESS", "day": entry.day, "timestamp": entry.timestamp })
        }
        Command::CurrentDay => serde_json::json!({ "day": service.current_day()? }),
        Command::Entries => {
            let entries = service.read_all()?;
            let lines = entries
                .iter()
                .map(daylog_core::repo::codec::encode_entry)
                .map(|line| line.and_then(|line| serde_json::from_str::<Value>(&line)))
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(lines)
        }
        Command::Summary { day } => serde_json::to_value(service.summarize_day(day)?)?,
        Command::Report => serde_json::to_value(service.summarize_all()?)?,
    };
    Ok(output)
}
