use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::event::CalendarEvent;
use crate::ics;

pub fn export_file_name(today: NaiveDate) -> String {
    format!("calendar-export-{}.ics", today.format("%Y-%m-%d"))
}

/// Encode events and write them to `calendar-export-<today>.ics` inside `dir`
pub async fn export_to_dir(
    events: &[CalendarEvent],
    dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(today));
    let content = ics::encode(events);

    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write calendar export: {}", path.display()))?;

    tracing::info!("Exported {} events to {}", events.len(), path.display());
    Ok(path)
}

/// Read an ICS file and hand the decoded events to `on_import`.
///
/// The callback is not invoked when the file cannot be read or is empty.
pub async fn import_file<F>(path: &Path, on_import: F) -> Result<()>
where
    F: FnOnce(Vec<CalendarEvent>),
{
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read calendar file: {}", path.display()))?;

    if content.is_empty() {
        tracing::warn!("{} is empty, nothing to import", path.display());
        return Ok(());
    }

    let events = ics::decode(&content);
    tracing::info!("Decoded {} events from {}", events.len(), path.display());
    on_import(events);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 9).unwrap()
    }

    #[test]
    fn test_export_file_name_uses_export_date() {
        assert_eq!(export_file_name(today()), "calendar-export-2024-07-09.ics");
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let event = CalendarEvent::new(
            "1",
            "Flight, AZ 610",
            Utc.with_ymd_and_hms(2030, 1, 1, 6, 0, 0).unwrap().into(),
            Utc.with_ymd_and_hms(2030, 1, 1, 14, 0, 0).unwrap().into(),
        );

        let path = export_to_dir(&[event], dir.path(), today()).await.unwrap();
        assert_eq!(path, dir.path().join("calendar-export-2024-07-09.ics"));

        let mut imported = Vec::new();
        import_file(&path, |events| imported = events).await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].title, "Flight, AZ 610");
    }

    #[tokio::test]
    async fn test_unreadable_file_never_calls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut called = false;
        let result = import_file(&dir.path().join("missing.ics"), |_| called = true).await;
        assert!(result.is_err());
        assert!(!called);
    }

    #[tokio::test]
    async fn test_empty_file_never_calls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ics");
        std::fs::write(&path, "").unwrap();

        let mut called = false;
        import_file(&path, |_| called = true).await.unwrap();
        assert!(!called);
    }

    #[tokio::test]
    async fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_to_dir(&[], &dir.path().join("nope"), today()).await;
        assert!(result.is_err());
    }
}
