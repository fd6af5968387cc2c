use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::event::EventType;

#[derive(Parser)]
#[command(name = "calendar-ics")]
#[command(author, version, about = "Manage a local event list and import/export it as iCalendar (.ics) files")]
pub struct Cli {
    /// Event store file (defaults to $CALENDAR_STORE, then ./calendar-events.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export all stored events to calendar-export-<today>.ics
    Export {
        /// Directory to write the export into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the ICS document instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Import events from an .ics file (use --dry-run to preview)
    Import {
        /// Path to the .ics file
        #[arg(short, long)]
        file: PathBuf,

        /// Preview events without saving them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Import events from a CSV file (use --dry-run to preview)
    ImportCsv {
        /// Path to the CSV file containing events
        #[arg(short, long)]
        file: PathBuf,

        /// Preview events without saving them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List stored events
    List {
        /// Only include events on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start_date: Option<NaiveDate>,

        /// Only include events on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,

        /// Show statistics (by type, by location)
        #[arg(short, long)]
        stats: bool,
    },

    /// Create a new event
    Add {
        #[arg(short, long)]
        title: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start_date: NaiveDate,

        /// Start time (HH:MM), ignored for all-day events
        #[arg(long)]
        start_time: Option<String>,

        /// End date (YYYY-MM-DD), defaults to the start date
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,

        /// End time (HH:MM), defaults to one hour after the start
        #[arg(long)]
        end_time: Option<String>,

        #[arg(long)]
        all_day: bool,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Change fields of a stored event
    Edit {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Delete a stored event
    Delete {
        #[arg(long)]
        id: String,
    },
}

/// Optional fields shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct EventFields {
    /// appointment, task, meeting or reminder
    #[arg(long = "type")]
    pub event_type: Option<EventType>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Minutes before the event (0 for none)
    #[arg(short, long)]
    pub reminder: Option<u32>,

    #[arg(long)]
    pub color: Option<String>,

    /// Repeat for several attendees
    #[arg(long = "attendee")]
    pub attendees: Vec<String>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD", s))
}
