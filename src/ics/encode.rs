use crate::event::{CalendarEvent, EventDate};

use super::{escape_text, PRODUCT_ID, UID_DOMAIN};

/// Encode events as a single ICS document.
///
/// Lines are separated by `\n` and the document has no trailing newline. Field values
/// are not validated: invalid dates are written as their raw text.
pub fn encode(events: &[CalendarEvent]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    for event in events {
        push_event(&mut lines, event);
    }

    lines.push("END:VCALENDAR".to_string());
    tracing::debug!("Encoded {} events", events.len());
    lines.join("\n")
}

fn push_event(lines: &mut Vec<String>, event: &CalendarEvent) {
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}@{}", event.id, UID_DOMAIN));
    lines.push(format!("DTSTART:{}", format_timestamp(&event.start_date)));
    lines.push(format!("DTEND:{}", format_timestamp(&event.end_date)));
    lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
    lines.push(format!(
        "DESCRIPTION:{}",
        escape_text(event.description.as_deref().unwrap_or_default())
    ));
    lines.push(format!(
        "LOCATION:{}",
        escape_text(event.location.as_deref().unwrap_or_default())
    ));
    lines.push("STATUS:CONFIRMED".to_string());
    lines.push("SEQUENCE:0".to_string());
    lines.push("TRANSP:OPAQUE".to_string());

    // Date-only pair follows the timed pair; decoders keep the last occurrence.
    if event.all_day {
        lines.push(format!("DTSTART;VALUE=DATE:{}", format_day(&event.start_date)));
        lines.push(format!("DTEND;VALUE=DATE:{}", format_day(&event.end_date)));
    }

    if let Some(minutes) = event.reminder.filter(|m| *m > 0) {
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push("DESCRIPTION:Reminder".to_string());
        lines.push(format!("TRIGGER:-PT{}M", minutes));
        lines.push("END:VALARM".to_string());
    }

    lines.push("END:VEVENT".to_string());
}

/// UTC basic format, `YYYYMMDDTHHMMSSZ`
fn format_timestamp(date: &EventDate) -> String {
    match date {
        EventDate::Valid(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
        EventDate::Invalid(raw) => raw.clone(),
    }
}

/// UTC calendar date, `YYYYMMDD`
fn format_day(date: &EventDate) -> String {
    match date {
        EventDate::Valid(dt) => dt.format("%Y%m%d").to_string(),
        EventDate::Invalid(raw) => raw.clone(),
    }
}
