//! iCalendar (ICS) import/export.
//!
//! The wire format is a small RFC 5545 subset: one VCALENDAR with a fixed preamble,
//! one VEVENT per event and an optional DISPLAY VALARM for reminders.

mod decode;
mod encode;

pub use decode::{decode, decode_with};
pub use encode::encode;

pub const PRODUCT_ID: &str = "-//Google Calendar Clone//Calendar//EN";
pub const UID_DOMAIN: &str = "calendar-clone.local";

/// Escape a text value for SUMMARY, DESCRIPTION and LOCATION.
///
/// Newlines first, then commas, then semicolons. Backslashes are left alone.
pub fn escape_text(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

/// Reverse the comma and semicolon escapes.
///
/// `\n` stays literal on purpose: imported text keeps the two-character marker.
pub fn unescape_text(value: &str) -> String {
    value.replace("\\,", ",").replace("\\;", ";")
}
