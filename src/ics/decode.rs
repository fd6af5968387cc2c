use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::event::{CalendarEvent, EventDate, EventType};
use crate::ids::{timestamp_id, IdGenerator};

use super::unescape_text;

/// Decode an ICS document, generating ids from the wall clock.
pub fn decode(content: &str) -> Vec<CalendarEvent> {
    decode_with(content, &mut timestamp_id)
}

/// Decode an ICS document.
///
/// Only VEVENT blocks that end up with a non-empty SUMMARY and both DTSTART and DTEND
/// are returned; everything else is dropped without an error. Lines outside a VEVENT
/// (including the calendar header) are ignored, and so is anything inside a VALARM.
pub fn decode_with(content: &str, ids: &mut impl IdGenerator) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut state = ScanState::Outside;

    for line in content.split('\n').map(str::trim) {
        let (next, completed) = state.step(line, ids);
        state = next;
        events.extend(completed);
    }

    if let ScanState::Inside(builder) | ScanState::Alarm(builder) = state {
        tracing::debug!("Discarding unterminated VEVENT {}", builder.id);
    }

    tracing::debug!("Decoded {} events", events.len());
    events
}

enum ScanState {
    Outside,
    Inside(EventBuilder),
    /// Inside a VALARM nested in the current VEVENT
    Alarm(EventBuilder),
}

impl ScanState {
    fn step(self, line: &str, ids: &mut impl IdGenerator) -> (ScanState, Option<CalendarEvent>) {
        match (self, line) {
            (_, "BEGIN:VEVENT") => (ScanState::Inside(EventBuilder::new(ids.next_id())), None),
            (ScanState::Inside(builder) | ScanState::Alarm(builder), "END:VEVENT") => {
                (ScanState::Outside, builder.build())
            }
            (ScanState::Outside, _) => (ScanState::Outside, None),
            (ScanState::Inside(builder), "BEGIN:VALARM") => (ScanState::Alarm(builder), None),
            (ScanState::Alarm(builder), "END:VALARM") => (ScanState::Inside(builder), None),
            (ScanState::Alarm(builder), _) => (ScanState::Alarm(builder), None),
            (ScanState::Inside(mut builder), line) => {
                builder.apply_line(line);
                (ScanState::Inside(builder), None)
            }
        }
    }
}

/// Properties the decoder understands; anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Summary,
    Description,
    Location,
    DtStart,
    DtEnd,
    Uid,
}

impl Property {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUMMARY" => Some(Property::Summary),
            "DESCRIPTION" => Some(Property::Description),
            "LOCATION" => Some(Property::Location),
            "DTSTART" => Some(Property::DtStart),
            "DTEND" => Some(Property::DtEnd),
            "UID" => Some(Property::Uid),
            _ => None,
        }
    }
}

struct EventBuilder {
    id: String,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<EventDate>,
    end: Option<EventDate>,
    all_day: bool,
}

impl EventBuilder {
    fn new(id: String) -> Self {
        Self {
            id,
            title: None,
            description: None,
            location: None,
            start: None,
            end: None,
            all_day: false,
        }
    }

    /// `NAME;PARAMS:VALUE`. The value keeps any further colons.
    fn apply_line(&mut self, line: &str) {
        let (raw_property, value) = line.split_once(':').unwrap_or((line, ""));
        let name = raw_property.split(';').next().unwrap_or(raw_property);

        let Some(property) = Property::from_name(name) else {
            return;
        };

        match property {
            Property::Summary => self.title = Some(unescape_text(value)),
            Property::Description => self.description = Some(unescape_text(value)),
            Property::Location => self.location = Some(unescape_text(value)),
            Property::DtStart | Property::DtEnd => {
                let date = if raw_property.contains("VALUE=DATE") {
                    self.all_day = true;
                    parse_date_value(value)
                } else {
                    parse_timestamp_value(value)
                };
                if !date.is_valid() {
                    tracing::debug!("Invalid {} value '{}' in VEVENT {}", name, value, self.id);
                }
                // Later occurrences win, so a trailing VALUE=DATE pair replaces the timed one.
                if property == Property::DtStart {
                    self.start = Some(date);
                } else {
                    self.end = Some(date);
                }
            }
            Property::Uid => {
                if !value.contains('@') {
                    self.id = value.to_string();
                }
            }
        }
    }

    fn build(self) -> Option<CalendarEvent> {
        let (Some(title), Some(start_date), Some(end_date)) = (self.title, self.start, self.end)
        else {
            tracing::debug!("Dropping incomplete VEVENT {}", self.id);
            return None;
        };
        if title.is_empty() {
            tracing::debug!("Dropping VEVENT {} with empty SUMMARY", self.id);
            return None;
        }

        Some(CalendarEvent {
            id: self.id,
            title,
            description: self.description,
            start_date,
            end_date,
            event_type: EventType::Appointment,
            color: None,
            all_day: self.all_day,
            location: self.location,
            attendees: Vec::new(),
            reminder: None,
        })
    }
}

/// `YYYYMMDD`; anything after the eighth character is ignored
fn parse_date_value(value: &str) -> EventDate {
    let parts = (value.get(0..4), value.get(4..6), value.get(6..8));
    let (Some(year), Some(month), Some(day)) = parts else {
        return EventDate::Invalid(value.to_string());
    };

    NaiveDate::parse_from_str(&format!("{}-{}-{}", year, month, day), "%Y-%m-%d")
        .map(EventDate::from_date)
        .unwrap_or_else(|_| EventDate::Invalid(value.to_string()))
}

/// `YYYYMMDDTHHMMSS` with optional `Z`, always read as UTC.
///
/// Values that are already RFC 3339 are accepted as well. Leap seconds are not.
fn parse_timestamp_value(value: &str) -> EventDate {
    let basic = value.strip_suffix('Z').unwrap_or(value);
    let parsed = if is_basic_timestamp(basic) {
        NaiveDateTime::parse_from_str(basic, "%Y%m%dT%H%M%S")
            .ok()
            .map(|naive| naive.and_utc())
    } else {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };

    match parsed {
        Some(dt) if dt.nanosecond() < 1_000_000_000 => EventDate::Valid(dt),
        _ => EventDate::Invalid(value.to_string()),
    }
}

/// Exactly eight digits, `T`, six digits
fn is_basic_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'T'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..].iter().all(u8::is_ascii_digit)
}
