mod config;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use freizeit_libs::{
    off_hours::{lookahead, synthesize_off_hours},
    schedule::parse_day_preference,
    Booking, BookingRequest, BusyInterval, Participant, Scheduler,
};
use log::{info, LevelFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::load_config;

#[derive(Parser)]
#[command(name = "freizeit")]
#[command(about = "Finds meeting slots everybody is free for", long_about = None)]
struct Cli {
    /// TOML file with [scheduler] and [logging] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr, repeatable
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick one meeting slot, trying the preferred day first
    Select {
        #[arg(long)]
        calendars: PathBuf,
        /// Meeting length in minutes
        #[arg(long)]
        duration: i64,
        /// Free text naming a weekday, e.g. "Thursday afternoon"
        #[arg(long, default_value = "")]
        prefer: String,
    },
    /// Common free slots on one date
    Slots {
        #[arg(long)]
        calendars: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value_t = 0)]
        min: i64,
    },
    /// Working hours and free time on every date in the calendars
    Report {
        #[arg(long)]
        calendars: PathBuf,
        #[arg(long, default_value_t = 30)]
        min: i64,
        #[arg(long)]
        json: bool,
    },
    /// Every place a meeting fits
    Suggest {
        #[arg(long)]
        calendars: PathBuf,
        #[arg(long)]
        duration: i64,
        /// Restrict to these weekdays, repeatable
        #[arg(long = "day", value_parser = weekday)]
        days: Vec<Weekday>,
    },
    /// Placeholder off-hours for somebody whose calendar is unavailable
    OffHours {
        /// RFC 3339 timestamp the look-ahead starts at
        #[arg(long)]
        from: String,
        /// Overrides lookahead_days from the config
        #[arg(long)]
        days: Option<u32>,
    },
    /// Select a slot and put the meeting on every attendee's calendar
    Book {
        #[arg(long)]
        calendars: PathBuf,
        #[arg(long)]
        duration: i64,
        #[arg(long, default_value = "")]
        prefer: String,
        #[arg(long)]
        organizer: String,
        #[arg(long)]
        subject: String,
        #[arg(long = "attendee")]
        attendees: Vec<String>,
    },
}

fn weekday(value: &str) -> Result<Weekday, String> {
    parse_day_preference(value).ok_or_else(|| format!("{:?} names no weekday", value))
}

fn setup_logging(level: LevelFilter) -> anyhow::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("installing logger")
}

/// Reads a JSON object mapping each participant to their calendar entries.
fn read_calendars(path: &Path) -> anyhow::Result<Vec<Participant>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading calendars {}", path.display()))?;
    let calendars: BTreeMap<String, Vec<BusyInterval>> = serde_json::from_str(&content)
        .with_context(|| format!("parsing calendars {}", path.display()))?;

    info!("loaded {} calendar(s) from {}", calendars.len(), path.display());
    Ok(calendars
        .into_iter()
        .map(|(id, intervals)| Participant::new(&id, intervals))
        .collect())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    setup_logging(config.level(cli.verbose)?)?;

    let scheduler = Scheduler::new(config.scheduler);

    match cli.command {
        Command::Select {
            calendars,
            duration,
            prefer,
        } => {
            let participants = read_calendars(&calendars)?;
            match scheduler.select_meeting_slot(&participants, duration, &prefer)? {
                Some(candidate) => print_json(&candidate)?,
                None => bail!("no {} minute slot fits every participant", duration),
            }
        }
        Command::Slots {
            calendars,
            date,
            min,
        } => {
            let participants = read_calendars(&calendars)?;
            print_json(&scheduler.find_common_free_slots(&participants, date, min)?)?;
        }
        Command::Report {
            calendars,
            min,
            json,
        } => {
            let report = scheduler.analyze(&read_calendars(&calendars)?, min)?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", report);
            }
        }
        Command::Suggest {
            calendars,
            duration,
            days,
        } => {
            let participants = read_calendars(&calendars)?;
            print_json(&scheduler.suggest_meeting_times(&participants, duration, &days)?)?;
        }
        Command::OffHours { from, days } => {
            let from = DateTime::parse_from_rfc3339(&from)
                .with_context(|| format!("{:?} is not an RFC 3339 timestamp", from))?;
            let mut config = scheduler.config().clone();
            if let Some(days) = days {
                config.lookahead_days = days;
            }
            let range = lookahead(from, &config).context("look-ahead leaves the calendar")?;
            print_json(&synthesize_off_hours(range, &config))?;
        }
        Command::Book {
            calendars,
            duration,
            prefer,
            organizer,
            subject,
            attendees,
        } => {
            let participants = read_calendars(&calendars)?;
            let Some(candidate) = scheduler.select_meeting_slot(&participants, duration, &prefer)?
            else {
                bail!("no {} minute slot fits every participant", duration);
            };

            let request = BookingRequest {
                organizer,
                invitees: attendees,
                subject,
            };
            print_json(&Booking::assemble(
                &candidate,
                &request,
                &participants,
                scheduler.config(),
            ))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_days() {
        let cli = Cli::parse_from([
            "freizeit", "-vv", "suggest", "--calendars", "c.json", "--duration", "30", "--day",
            "monday", "--day", "Friday",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Suggest { days, .. } => assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]),
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn rejects_unknown_weekday() {
        assert!(weekday("someday").is_err());
        assert_eq!(weekday("Thursday"), Ok(Weekday::Thu));
    }
}
