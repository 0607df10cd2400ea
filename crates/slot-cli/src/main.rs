//! `slots` CLI — validate schedules, list candidates and resolve bookable slots.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a schedule form (stdin → stdout)
//! echo '{"timezone":"UTC","availabilities":[]}' | slots validate
//!
//! # Quarter-hour candidates for the next two days in New York
//! slots candidates --timezone America/New_York --days 2
//!
//! # Resolve bookable slots from a request file
//! slots resolve -i request.json -o slots.json
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG` (e.g. `RUST_LOG=debug`) to see it.

use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use slot_engine::busy::{from_calendar_events, BusyInterval, CalendarEvent};
use slot_engine::{
    resolve_with_policy, CandidateWindow, DstPolicy, Horizon, ScheduleForm, SlotError,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Weekly availability and bookable slot resolution"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schedule form and print the normalized schedule
    Validate {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Print candidate start times, one RFC 3339 instant per line
    Candidates {
        /// IANA timezone whose local days bound the horizon
        #[arg(long)]
        timezone: String,
        /// Starting instant (RFC 3339); defaults to now
        #[arg(long)]
        from: Option<String>,
        /// Minutes between candidates
        #[arg(long, default_value_t = 15)]
        step: u32,
        /// Limit the horizon to this many days instead of one year
        #[arg(long)]
        days: Option<u32>,
    },
    /// Resolve which candidates are bookable
    Resolve {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Input document for `slots resolve`.
#[derive(Deserialize)]
struct ResolveInput {
    schedule: Option<ScheduleForm>,
    duration_minutes: u32,
    #[serde(default)]
    candidates: Vec<DateTime<Utc>>,
    /// Busy time already resolved to instants.
    #[serde(default)]
    busy: Vec<BusyInterval>,
    /// Raw provider events, read in the schedule's timezone.
    #[serde(default)]
    events: Vec<CalendarEvent>,
    #[serde(default)]
    dst_policy: DstPolicy,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => {
            let json = read_input(input.as_deref())?;
            let form = ScheduleForm::from_json(&json).context("Failed to parse schedule form")?;
            match form.validate() {
                Ok(schedule) => {
                    println!("{}", serde_json::to_string_pretty(&schedule)?);
                }
                Err(SlotError::InvalidSchedule(validation)) => {
                    for issue in &validation.issues {
                        eprintln!("{}", issue);
                    }
                    process::exit(1);
                }
                Err(other) => return Err(other.into()),
            }
        }
        Commands::Candidates {
            timezone,
            from,
            step,
            days,
        } => {
            let tz: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", timezone))?;
            let now = match from.as_deref() {
                Some(raw) => raw
                    .parse::<DateTime<Utc>>()
                    .with_context(|| format!("Invalid --from instant: {}", raw))?,
                None => Utc::now(),
            };
            if step == 0 {
                anyhow::bail!("--step must be at least 1 minute");
            }
            let window = CandidateWindow {
                step_minutes: step,
                horizon: days.map_or(Horizon::Years(1), Horizon::Days),
            };

            let candidates = window.generate(now, tz);
            debug!(count = candidates.len(), "generated candidates");
            let lines: Vec<String> = candidates.iter().map(|c| c.to_rfc3339()).collect();
            println!("{}", lines.join("\n"));
        }
        Commands::Resolve { input, output } => {
            let json = read_input(input.as_deref())?;
            let request: ResolveInput =
                serde_json::from_str(&json).context("Failed to parse resolve request")?;
            let bookable = run_resolve(request)?;
            let rendered = serde_json::to_string_pretty(&bookable)?;
            write_output(output.as_deref(), &rendered)?;
        }
    }

    Ok(())
}

fn run_resolve(request: ResolveInput) -> Result<Vec<DateTime<Utc>>> {
    if request.duration_minutes == 0 {
        anyhow::bail!("duration_minutes must be greater than zero");
    }

    let schedule = request
        .schedule
        .as_ref()
        .map(ScheduleForm::validate)
        .transpose()
        .context("Invalid schedule")?;

    let mut busy = request.busy;
    if let Some(schedule) = &schedule {
        busy.extend(from_calendar_events(&request.events, schedule.timezone));
    }

    let bookable = resolve_with_policy(
        &request.candidates,
        request.duration_minutes,
        schedule.as_ref(),
        &busy,
        request.dst_policy,
    );
    info!(
        candidates = request.candidates.len(),
        bookable = bookable.len(),
        "resolved"
    );
    Ok(bookable)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
