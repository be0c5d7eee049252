//! `planner` CLI — query the scheduling engine from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Earliest free 30-minute slot on a day (events JSON on stdin)
//! cat events.json | planner suggest --date 2024-06-01 --duration 30
//!
//! # Same, from a file, with a custom working window
//! planner --config planner.toml suggest -i events.json --date 2024-06-01
//!
//! # Store patch for a calendar drag
//! planner reschedule --start 2024-06-01T14:00 --end 2024-06-01T14:45
//!
//! # When would the reminder fire, and is it still ahead of "now"?
//! planner remind-at --date 2024-06-01 --start 14:00
//!
//! # Overlapping bookings
//! planner overlaps -i events.json
//! ```

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use planner_engine::event::{parse_time, EventTimes};
use planner_engine::freebusy::{find_free_slot, normalize_duration, SlotOutcome};
use planner_engine::reminder::{reminder_fire_at, Clock, SystemClock};
use planner_engine::{find_overlaps, intervals_for, Event, PlannerConfig};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "planner", version, about = "Personal calendar scheduling engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (window, default duration, reminder lead)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest the earliest free slot on a day
    Suggest {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Day to search, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Requested length in minutes (defaults to the configured duration)
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the store patch for a drag or resize
    Reschedule {
        /// New start, YYYY-MM-DDTHH:MM
        #[arg(long)]
        start: String,
        /// New end, YYYY-MM-DDTHH:MM
        #[arg(long)]
        end: String,
    },
    /// Show when an event's reminder would fire
    RemindAt {
        /// Event date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Event start, HH:MM
        #[arg(long)]
        start: String,
        /// Treat this as "now" instead of the local clock (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        now: Option<String>,
    },
    /// List overlapping bookings
    Overlaps {
        /// Events JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = match cli.config.as_deref() {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PlannerConfig::default(),
    };

    match cli.command {
        Commands::Suggest {
            input,
            date,
            duration,
            json,
        } => {
            let events = read_events(input.as_deref())?;
            let duration = normalize_duration(duration, config.default_duration_minutes);
            let intervals = intervals_for(&events, date);
            debug!(%date, duration, bookings = intervals.len(), "searching for free slot");

            let outcome = find_free_slot(&intervals, duration, config.working_window());
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    SlotOutcome::Found(slot) => {
                        println!("{} {} - {}", date, slot.start_label(), slot.end_label())
                    }
                    SlotOutcome::Unavailable => {
                        println!("No free slot found for the selected duration.")
                    }
                }
            }
        }
        Commands::Reschedule { start, end } => {
            let start = parse_datetime(&start)?;
            let end = parse_datetime(&end)?;
            let patch = EventTimes::from_gesture(start, end);
            println!("{}", serde_json::to_string_pretty(&patch)?);
        }
        Commands::RemindAt { date, start, now } => {
            let start = parse_time("start time", &start)?;
            let now = match now {
                Some(raw) => parse_datetime(&raw)?,
                None => SystemClock.now(),
            };
            let fire_at = reminder_fire_at(date, start, config.reminder.lead_minutes)
                .context("Reminder time is out of range")?;
            if fire_at > now {
                println!("{}", fire_at.format("%Y-%m-%d %H:%M"));
            } else {
                println!(
                    "Too late: reminder time {} has already passed.",
                    fire_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Overlaps { input } => {
            let events = read_events(input.as_deref())?;
            let overlaps = find_overlaps(&events);
            println!("{}", serde_json::to_string_pretty(&overlaps)?);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Accepts `YYYY-MM-DDTHH:MM`, with optional seconds, `T` or a space.
fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .with_context(|| format!("Invalid date-time '{}': expected YYYY-MM-DDTHH:MM", raw))
}

fn read_events(path: Option<&str>) -> Result<Vec<Event>> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse events JSON")
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
