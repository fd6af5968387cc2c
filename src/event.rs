use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Appointment,
    Task,
    Meeting,
    Reminder,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Appointment => "appointment",
            EventType::Task => "task",
            EventType::Meeting => "meeting",
            EventType::Reminder => "reminder",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "appointment" => Ok(EventType::Appointment),
            "task" => Ok(EventType::Task),
            "meeting" => Ok(EventType::Meeting),
            "reminder" => Ok(EventType::Reminder),
            other => Err(format!(
                "Unknown event type '{}'. Use appointment, task, meeting or reminder",
                other
            )),
        }
    }
}

/// A start or end timestamp.
///
/// Decoding never fails on a malformed date; it produces `Invalid` carrying the raw
/// text instead, and the event is still kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDate {
    Valid(DateTime<Utc>),
    Invalid(String),
}

impl EventDate {
    /// Midnight UTC of the given calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        EventDate::Valid(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            EventDate::Valid(dt) => Some(*dt),
            EventDate::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, EventDate::Valid(_))
    }

    pub fn date_naive(&self) -> Option<NaiveDate> {
        self.as_datetime().map(|dt| dt.date_naive())
    }
}

impl From<DateTime<Utc>> for EventDate {
    fn from(dt: DateTime<Utc>) -> Self {
        EventDate::Valid(dt)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventDate::Valid(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventDate::Invalid(_) => f.write_str("Invalid Date"),
        }
    }
}

// The store keeps dates the way JSON.stringify writes them; an invalid date becomes null.
impl Serialize for EventDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EventDate::Valid(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            EventDate::Invalid(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => EventDate::Valid(dt.with_timezone(&Utc)),
                Err(_) => EventDate::Invalid(s),
            },
            None => EventDate::Invalid(String::new()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: EventDate,
    pub end_date: EventDate,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    /// Minutes before the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<u32>,
}

impl CalendarEvent {
    /// A plain appointment with only the required fields set
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: EventDate,
        end_date: EventDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start_date,
            end_date,
            event_type: EventType::Appointment,
            color: None,
            all_day: false,
            location: None,
            attendees: Vec::new(),
            reminder: None,
        }
    }
}

/// Start and end instants for a newly entered event, all in UTC.
///
/// All-day events run from 00:00:00 of the start date to 23:59:59 of the end date and
/// ignore any times. A timed event without an end time lasts one hour; a missing start
/// time means midnight. The end date defaults to the start date.
pub fn event_span(
    start_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_date: Option<NaiveDate>,
    end_time: Option<NaiveTime>,
    all_day: bool,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_date = end_date.unwrap_or(start_date);

    if all_day {
        let start = start_date.and_time(NaiveTime::MIN).and_utc();
        let end = end_date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::seconds(1);
        return (start, end);
    }

    let start = start_date
        .and_time(start_time.unwrap_or(NaiveTime::MIN))
        .and_utc();
    let end = match end_time {
        Some(t) => end_date.and_time(t).and_utc(),
        None => start + Duration::hours(1),
    };
    (start, end)
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_day {
            let day = |d: &EventDate| {
                d.date_naive()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| d.to_string())
            };
            write!(
                f,
                "[ALL DAY] {} - {}: {}",
                day(&self.start_date),
                day(&self.end_date),
                self.title
            )
        } else {
            write!(f, "{} - {}: {}", self.start_date, self.end_date, self.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_store_shape_uses_camel_case_keys() {
        let mut event = CalendarEvent::new(
            "1700000000000",
            "Dentist",
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap().into(),
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap().into(),
        );
        event.reminder = Some(15);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["startDate"], "2024-03-05T09:30:00.000Z");
        assert_eq!(json["endDate"], "2024-03-05T10:00:00.000Z");
        assert_eq!(json["type"], "appointment");
        assert_eq!(json["allDay"], false);
        assert_eq!(json["reminder"], 15);
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_invalid_date_is_stored_as_null() {
        let event = CalendarEvent::new(
            "x",
            "Broken",
            EventDate::Invalid("2024XX".to_string()),
            EventDate::Invalid("2024XX".to_string()),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["startDate"].is_null());

        let back: CalendarEvent = serde_json::from_value(json).unwrap();
        assert!(!back.start_date.is_valid());
    }

    #[test]
    fn test_loads_browser_store_record() {
        let raw = r#"{
            "id": "1717171717171",
            "title": "Standup",
            "description": "",
            "startDate": "2024-06-01T08:00:00.000Z",
            "endDate": "2024-06-01T08:15:00.000Z",
            "type": "meeting",
            "allDay": false,
            "reminder": 0
        }"#;
        let event: CalendarEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, EventType::Meeting);
        assert_eq!(event.description.as_deref(), Some(""));
        assert_eq!(
            event.start_date,
            EventDate::Valid(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
        );
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, m, sec).unwrap()
    }

    #[test]
    fn test_all_day_span_covers_whole_days() {
        let time = NaiveTime::from_hms_opt(10, 0, 0);
        assert_eq!(
            event_span(day(20), time, Some(day(22)), time, true),
            (at(20, 0, 0, 0), at(22, 23, 59, 59))
        );
        assert_eq!(
            event_span(day(20), None, None, None, true),
            (at(20, 0, 0, 0), at(20, 23, 59, 59))
        );
    }

    #[test]
    fn test_timed_span_defaults_to_one_hour() {
        let start = NaiveTime::from_hms_opt(16, 30, 0);
        assert_eq!(
            event_span(day(20), start, None, None, false),
            (at(20, 16, 30, 0), at(20, 17, 30, 0))
        );
        // An explicit end date without an end time still means one hour.
        assert_eq!(
            event_span(day(20), start, Some(day(21)), None, false),
            (at(20, 16, 30, 0), at(20, 17, 30, 0))
        );
        let end = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(
            event_span(day(20), start, Some(day(21)), end, false),
            (at(20, 16, 30, 0), at(21, 9, 0, 0))
        );
    }

    #[test]
    fn test_event_type_from_str() {
        assert_eq!("Meeting".parse::<EventType>(), Ok(EventType::Meeting));
        assert!("party".parse::<EventType>().is_err());
    }
}
