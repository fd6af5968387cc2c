mod cli;
mod config;
mod csv_parser;
mod error;
mod event;
mod ics;
mod ids;
mod store;
mod transfer;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, EventFields};
use crate::config::Config;
use crate::event::{event_span, CalendarEvent, EventDate, EventType};
use crate::store::EventStore;

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn filter_events(
    events: &[CalendarEvent],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<&CalendarEvent> {
    let mut filtered: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| {
            // Events with an unreadable start only show up unfiltered
            let Some(day) = e.start_date.date_naive() else {
                return start_date.is_none() && end_date.is_none();
            };
            if let Some(sd) = start_date {
                if day < sd {
                    return false;
                }
            }
            if let Some(ed) = end_date {
                if day > ed {
                    return false;
                }
            }
            true
        })
        .collect();

    // Invalid dates sort last
    filtered.sort_by_key(|e| (e.start_date.as_datetime().is_none(), e.start_date.as_datetime()));

    filtered
}

fn print_events(events: &[&CalendarEvent]) {
    println!("\n{:<22} {:<36} {:<12} {:<17} {:<17} {:<25}",
        "id", "title", "type", "start", "end", "location");
    println!("{}", "-".repeat(134));
    for event in events {
        let (start, end) = if event.all_day {
            (format!("{} all-day", day_or_invalid(&event.start_date)),
             format!("{} all-day", day_or_invalid(&event.end_date)))
        } else {
            (event.start_date.to_string(), event.end_date.to_string())
        };
        println!("{:<22} {:<36} {:<12} {:<17} {:<17} {:<25}",
            truncate(&event.id, 22),
            truncate(&event.title, 34),
            event.event_type,
            start,
            end,
            event.location.as_deref().map(|l| truncate(l, 23)).unwrap_or_default(),
        );
        if let Some(desc) = event.description.as_deref().filter(|d| !d.is_empty()) {
            let desc_preview = truncate(desc.replace('\n', " | ").as_str(), 100);
            println!("  description: {}", desc_preview);
        }
        if let Some(minutes) = event.reminder.filter(|m| *m > 0) {
            println!("  reminder: {} minutes before", minutes);
        }
    }
}

fn day_or_invalid(date: &EventDate) -> String {
    date.date_naive()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

fn print_stats(events: &[&CalendarEvent]) {
    println!("\n{}", "=".repeat(60));
    println!("STATISTICS");
    println!("{}", "=".repeat(60));

    let with_reminder = events.iter().filter(|e| e.reminder.unwrap_or(0) > 0).count();
    println!("\nTotal Events: {} ({} with reminder)", events.len(), with_reminder);

    let mut by_type: HashMap<EventType, usize> = HashMap::new();
    for event in events {
        *by_type.entry(event.event_type).or_insert(0) += 1;
    }

    println!("\nEvents by Type:");
    println!("{:-<50}", "");
    let mut type_counts: Vec<_> = by_type.into_iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (event_type, total) in type_counts {
        println!("  {:>4}  {}", total, event_type);
    }

    let mut by_location: HashMap<String, usize> = HashMap::new();
    for event in events {
        let location = event
            .location
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "(No location)".to_string());
        *by_location.entry(location).or_insert(0) += 1;
    }

    println!("\nEvents by Location:");
    println!("{:-<50}", "");
    let mut location_counts: Vec<_> = by_location.into_iter().collect();
    location_counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (location, total) in location_counts {
        println!("  {:>4}  {}", total, location);
    }

    println!();
}

fn apply_fields(event: &mut CalendarEvent, fields: EventFields) {
    if let Some(event_type) = fields.event_type {
        event.event_type = event_type;
    }
    if let Some(description) = fields.description {
        event.description = Some(description.trim().to_string());
    }
    if let Some(location) = fields.location {
        event.location = Some(location.trim().to_string());
    }
    if let Some(reminder) = fields.reminder {
        event.reminder = Some(reminder).filter(|m| *m > 0);
    }
    if let Some(color) = fields.color {
        event.color = Some(color);
    }
    if !fields.attendees.is_empty() {
        event.attendees = fields.attendees;
    }
}

/// Build a new event the way the event form does
fn new_event(
    title: &str,
    start_date: NaiveDate,
    start_time: Option<&str>,
    end_date: Option<NaiveDate>,
    end_time: Option<&str>,
    all_day: bool,
) -> Result<CalendarEvent> {
    let start_time = start_time.map(csv_parser::parse_time).transpose()?;
    let end_time = end_time.map(csv_parser::parse_time).transpose()?;
    let (start, end) = event_span(start_date, start_time, end_date, end_time, all_day);

    let mut event = CalendarEvent::new(ids::timestamp_id(), title.trim(), start.into(), end.into());
    event.all_day = all_day;
    Ok(event)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::resolve(cli.store);
    let mut store = EventStore::load(&config.store_path).await?;

    match cli.command {
        Commands::Export { output_dir, stdout } => {
            if stdout {
                println!("{}", ics::encode(store.events()));
                return Ok(());
            }

            let today = Utc::now().date_naive();
            let path = transfer::export_to_dir(store.events(), &output_dir, today).await?;
            println!("Exported {} events to {}", store.events().len(), path.display());
        }
        Commands::Import { file, dry_run } => {
            tracing::info!("Importing events from: {}", file.display());

            let mut imported = Vec::new();
            transfer::import_file(&file, |events| imported = events).await?;

            if dry_run {
                tracing::info!("Dry run mode - not saving events");
                print_events(&imported.iter().collect::<Vec<_>>());
                println!();
                return Ok(());
            }

            let count = imported.len();
            store.extend(imported);
            store.save().await?;
            println!("Imported {} events", count);
        }
        Commands::ImportCsv { file, dry_run } => {
            tracing::info!("Importing events from: {}", file.display());

            let events = csv_parser::parse_csv(&file, &mut ids::timestamp_id)?;
            tracing::info!("Parsed {} events", events.len());

            if dry_run {
                tracing::info!("Dry run mode - not saving events");
                print_events(&events.iter().collect::<Vec<_>>());
                println!();
                return Ok(());
            }

            let count = events.len();
            store.extend(events);
            store.save().await?;
            println!("Imported {} events", count);
        }
        Commands::List { start_date, end_date, stats } => {
            let events = filter_events(store.events(), start_date, end_date);
            if start_date.is_some() || end_date.is_some() {
                tracing::info!("After filtering: {} of {} events", events.len(), store.events().len());
            }

            print_events(&events);
            if stats {
                print_stats(&events);
            }
            println!();
        }
        Commands::Add { title, start_date, start_time, end_date, end_time, all_day, fields } => {
            if title.trim().is_empty() {
                anyhow::bail!("Event title cannot be empty");
            }

            let mut event = new_event(
                &title,
                start_date,
                start_time.as_deref(),
                end_date,
                end_time.as_deref(),
                all_day,
            )?;
            apply_fields(&mut event, fields);

            println!("Created event {}: {}", event.id, event);
            store.add(event);
            store.save().await?;
        }
        Commands::Edit { id, title, fields } => {
            let updated = store.update(&id, |event| {
                if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
                    event.title = title.trim().to_string();
                }
                apply_fields(event, fields);
            })?;
            println!("Updated event {}: {}", id, updated);
            store.save().await?;
        }
        Commands::Delete { id } => {
            let removed = store.remove(&id)?;
            store.save().await?;
            println!("Deleted event {}: {}", id, removed.title);
        }
    }

    tracing::debug!("Event store at {}", store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }

    #[test]
    fn test_new_all_day_event_spans_whole_days() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let event = new_event(" Trip ", day, Some("10:00"), None, None, true).unwrap();
        assert!(event.all_day);
        assert_eq!(event.title, "Trip");
        assert_eq!(
            event.start_date,
            EventDate::Valid(Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap())
        );
        assert_eq!(
            event.end_date,
            EventDate::Valid(Utc.with_ymd_and_hms(2024, 5, 20, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_new_timed_event_defaults_to_one_hour() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let event = new_event("Call", day, Some("16:30"), None, None, false).unwrap();
        assert_eq!(
            event.end_date,
            EventDate::Valid(Utc.with_ymd_and_hms(2024, 5, 20, 17, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_filter_events_by_range_and_order() {
        let at = |d: u32, h: u32| EventDate::Valid(Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap());
        let events = vec![
            CalendarEvent::new("a", "Late", at(20, 9), at(20, 10)),
            CalendarEvent::new("b", "Early", at(2, 9), at(2, 10)),
            CalendarEvent::new("c", "Middle", at(10, 9), at(10, 10)),
            CalendarEvent::new("d", "Broken", EventDate::Invalid(String::new()), at(10, 10)),
        ];

        let all: Vec<_> = filter_events(&events, None, None).into_iter().map(|e| e.id.as_str()).collect();
        assert_eq!(all, vec!["b", "c", "a", "d"]);

        let june = filter_events(
            &events,
            NaiveDate::from_ymd_opt(2024, 6, 5),
            NaiveDate::from_ymd_opt(2024, 6, 15),
        );
        assert_eq!(june.len(), 1);
        assert_eq!(june[0].title, "Middle");
    }

    #[test]
    fn test_apply_fields_clears_zero_reminder() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let mut event = new_event("Call", day, None, None, None, false).unwrap();
        apply_fields(&mut event, EventFields {
            event_type: Some(EventType::Task),
            reminder: Some(0),
            attendees: vec!["ann@example.com".to_string()],
            ..Default::default()
        });
        assert_eq!(event.event_type, EventType::Task);
        assert_eq!(event.reminder, None);
        assert_eq!(event.attendees, vec!["ann@example.com"]);
    }
}
