//! `slotfinder` CLI — resolve and refresh cleaners' next available slots.
//!
//! ## Usage
//!
//! ```sh
//! # Next free two-hour slot for one cleaner (stdin → stdout)
//! cat cleaner.json | slotfinder next --duration 2
//!
//! # Pin "now" for reproducible output
//! slotfinder next -i cleaner.json --duration 2 --now 2026-03-01T12:00:00Z
//!
//! # Refresh every cleaner in an export for the default short/long tiers
//! slotfinder refresh -i export.json -o next-available.json
//!
//! # Custom tiers (field=hours), chronological probing
//! slotfinder --order chronological refresh -i export.json \
//!     --tier nextAvailable3h=3 --tier nextAvailable6h=6
//!
//! # Raw display grid for an interval, or for one date of a schedule
//! slotfinder grid --start 09:00 --end 13:00 --interval 30
//! slotfinder grid -i cleaner.json --date 2026-03-02
//! ```
//!
//! Resolver options and the log level can also come from `SLOTFINDER_*`
//! environment variables or a `.env` file. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use slot_engine::resolver::CANDIDATE_STEP_MINUTES;
use slot_engine::slots::DEFAULT_SLOT_MINUTES;
use slot_engine::{
    Booking, CandidateOrder, CleanerRecord, DurationTier, Exception, Resolver, ResolverOptions,
    WeeklySchedule, HORIZON_DAYS,
};
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slotfinder",
    version,
    about = "Find cleaners' next available booking slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    resolver: ResolverArgs,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "slot_engine=debug")
    #[arg(long, global = true, env = "SLOTFINDER_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Args)]
struct ResolverArgs {
    /// Number of days to scan, counting today
    #[arg(long, global = true, env = "SLOTFINDER_HORIZON_DAYS", default_value_t = HORIZON_DAYS)]
    horizon_days: u32,

    /// Minutes between probed candidate starts
    #[arg(long, global = true, env = "SLOTFINDER_STEP_MINUTES", default_value_t = CANDIDATE_STEP_MINUTES)]
    step_minutes: u32,

    /// Order in which a day's candidates are probed
    #[arg(long, global = true, env = "SLOTFINDER_ORDER", value_enum, default_value_t = OrderArg::Declared)]
    order: OrderArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Interval by interval, as listed in the schedule
    Declared,
    /// All of a day's candidates by start time
    Chronological,
}

impl From<OrderArg> for CandidateOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Declared => CandidateOrder::Declared,
            OrderArg::Chronological => CandidateOrder::Chronological,
        }
    }
}

impl ResolverArgs {
    fn options(&self) -> ResolverOptions {
        ResolverOptions {
            horizon_days: self.horizon_days,
            step_minutes: self.step_minutes,
            order: self.order.into(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the next free slot for a single cleaner
    Next {
        /// JSON file with schedule, exceptions and bookings (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Requested duration in hours
        #[arg(short, long)]
        duration: f64,
        /// Resolve as of this RFC 3339 instant instead of the current time
        #[arg(long)]
        now: Option<String>,
    },
    /// Refresh next-available fields for every cleaner in an export
    Refresh {
        /// JSON file with `cleaners` and `bookings` (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Duration tier as field=hours; repeatable (defaults to short=2h, long=4h)
        #[arg(long = "tier")]
        tiers: Vec<DurationTier>,
        /// Resolve as of this RFC 3339 instant instead of the current time
        #[arg(long)]
        now: Option<String>,
    },
    /// Print the raw slot grid for an interval or for one date of a schedule
    Grid {
        /// Interval start (HH:MM)
        #[arg(long, required_unless_present = "date", requires = "end")]
        start: Option<String>,
        /// Interval end (HH:MM)
        #[arg(long, required_unless_present = "date", requires = "start")]
        end: Option<String>,
        /// Calendar date (YYYY-MM-DD) to lay out from a schedule file
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<String>,
        /// JSON file with schedule and exceptions, used with --date (reads stdin if omitted)
        #[arg(short, long, requires = "date")]
        input: Option<String>,
        /// Slot length in minutes
        #[arg(long, default_value_t = DEFAULT_SLOT_MINUTES)]
        interval: u32,
    },
}

/// One cleaner's schedule data as exported from the document store.
#[derive(Deserialize)]
struct CleanerInput {
    #[serde(default, alias = "availability")]
    schedule: WeeklySchedule,
    #[serde(default)]
    exceptions: Vec<Exception>,
    #[serde(default)]
    bookings: Vec<Booking>,
}

/// A batch export: all cleaners plus every booking in the horizon.
#[derive(Deserialize)]
struct RefreshInput {
    cleaners: Vec<CleanerRecord>,
    #[serde(default)]
    bookings: Vec<Booking>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let resolver = Resolver::new(cli.resolver.options());

    match cli.command {
        Commands::Next {
            input,
            duration,
            now,
        } => {
            let raw = read_input(input.as_deref())?;
            let cleaner: CleanerInput =
                serde_json::from_str(&raw).context("Failed to parse cleaner JSON")?;
            let now = parse_now(now.as_deref())?;

            let slot = resolver
                .resolve(
                    &cleaner.schedule,
                    &cleaner.exceptions,
                    &cleaner.bookings,
                    duration,
                    now,
                )
                .context("Failed to resolve next available slot")?;

            let body = serde_json::json!({ "nextAvailable": slot });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Refresh {
            input,
            output,
            tiers,
            now,
        } => {
            let raw = read_input(input.as_deref())?;
            let export: RefreshInput =
                serde_json::from_str(&raw).context("Failed to parse refresh export JSON")?;
            let now = parse_now(now.as_deref())?;
            let tiers = if tiers.is_empty() {
                DurationTier::defaults()
            } else {
                tiers
            };

            info!(
                cleaners = export.cleaners.len(),
                bookings = export.bookings.len(),
                "refreshing next available slots"
            );
            let results =
                slot_engine::refresh_all(&export.cleaners, &export.bookings, &tiers, &resolver, now);

            let pretty = serde_json::to_string_pretty(&results)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Grid {
            start,
            end,
            date,
            input,
            interval,
        } => {
            let grid = match (date, start, end) {
                (Some(date), _, _) => {
                    let day = slot_engine::clock::parse_date("--date", &date)?;
                    let raw = read_input(input.as_deref())?;
                    let cleaner: CleanerInput =
                        serde_json::from_str(&raw).context("Failed to parse schedule JSON")?;
                    slot_engine::day_grid(&cleaner.schedule, &cleaner.exceptions, day, interval)?
                }
                (None, Some(start), Some(end)) => {
                    slot_engine::generate_slots(&start, &end, interval)?
                }
                _ => anyhow::bail!("grid needs either --date or both --start and --end"),
            };
            println!("{}", serde_json::to_string_pretty(&grid)?);
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber; `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level/filter: '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now instant: '{}'", raw)),
        None => Ok(Utc::now()),
    }
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
