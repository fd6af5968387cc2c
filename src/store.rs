use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{StoreError, StoreResult};
use crate::event::CalendarEvent;

/// Event list persisted as a JSON array in a single file.
#[derive(Debug)]
pub struct EventStore {
    path: PathBuf,
    events: Vec<CalendarEvent>,
}

impl EventStore {
    /// Load the store, starting empty if the file does not exist yet
    pub async fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let events = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No event store at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Loaded {} events from {}", events.len(), path.display());
        Ok(Self { path, events })
    }

    pub async fn save(&self) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, json).await?;
        tracing::debug!("Saved {} events to {}", self.events.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn add(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    /// Append imported events after the existing ones
    pub fn extend(&mut self, events: impl IntoIterator<Item = CalendarEvent>) {
        self.events.extend(events);
    }

    pub fn update<F>(&mut self, id: &str, apply: F) -> StoreResult<&CalendarEvent>
    where
        F: FnOnce(&mut CalendarEvent),
    {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        apply(event);
        Ok(&*event)
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<CalendarEvent> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.events.remove(index))
    }
}
