use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use csv::Reader;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::event::{event_span, CalendarEvent, EventDate, EventType};
use crate::ids::IdGenerator;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    start_date: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    reminder: Option<String>,
}

pub fn parse_csv(path: &Path, ids: &mut impl IdGenerator) -> Result<Vec<CalendarEvent>> {
    let reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    read_events(reader, ids)
}

fn read_events<R: Read>(
    mut reader: Reader<R>,
    ids: &mut impl IdGenerator,
) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord = result
            .with_context(|| format!("Failed to parse row {}", index + 1))?;

        let event = parse_record(record, index + 1, ids.next_id())?;
        events.push(event);
    }

    Ok(events)
}

fn parse_record(record: CsvRecord, row_num: usize, id: String) -> Result<CalendarEvent> {
    if record.title.trim().is_empty() {
        anyhow::bail!("Missing title in row {}", row_num);
    }

    let start_date = parse_date(&record.start_date)
        .with_context(|| format!("Invalid start_date in row {}: '{}'", row_num, record.start_date))?;

    let end_date = match non_empty(&record.end_date) {
        Some(d) => parse_date(d)
            .with_context(|| format!("Invalid end_date in row {}: '{}'", row_num, d))?,
        None => start_date,
    };

    let start_time = match non_empty(&record.start_time) {
        Some(t) => Some(parse_time(t)
            .with_context(|| format!("Invalid start_time in row {}: '{}'", row_num, t))?),
        None => None,
    };

    let end_time = match non_empty(&record.end_time) {
        Some(t) => Some(parse_time(t)
            .with_context(|| format!("Invalid end_time in row {}: '{}'", row_num, t))?),
        None => None,
    };

    let event_type = match non_empty(&record.event_type) {
        Some(t) => t
            .parse::<EventType>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid type in row {}", row_num))?,
        None => EventType::Appointment,
    };

    let reminder = match non_empty(&record.reminder) {
        Some(r) => Some(r.trim().parse::<u32>()
            .with_context(|| format!("Invalid reminder in row {}: '{}'", row_num, r))?),
        None => None,
    };

    // No times at all means a whole-day event, like the event form produces.
    let all_day = start_time.is_none() && end_time.is_none();
    let (start, end) = event_span(start_date, start_time, Some(end_date), end_time, all_day);

    Ok(CalendarEvent {
        id,
        title: record.title.trim().to_string(),
        description: record.description.filter(|s| !s.is_empty()),
        start_date: EventDate::Valid(start),
        end_date: EventDate::Valid(end),
        event_type,
        color: None,
        all_day,
        location: record.location.filter(|s| !s.is_empty()),
        attendees: Vec::new(),
        reminder: reminder.filter(|m| *m > 0),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    // Try common date formats
    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%m-%d-%Y",
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s.trim(), fmt) {
            return Ok(date);
        }
    }

    anyhow::bail!("Could not parse date: '{}'", s)
}

pub fn parse_time(s: &str) -> Result<NaiveTime> {
    // Try common time formats
    let formats = [
        "%H:%M:%S",
        "%H:%M",
        "%I:%M:%S %p",
        "%I:%M %p",
        "%I:%M%p",
    ];

    let s = s.trim().to_uppercase();

    for fmt in formats {
        if let Ok(time) = NaiveTime::parse_from_str(&s, fmt) {
            return Ok(time);
        }
    }

    anyhow::bail!("Could not parse time: '{}'", s)
}
