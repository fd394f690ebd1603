//! Data model shared by the source reader, reconciler and calendar gateway.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Popup reminders attached to every created event, in minutes before start.
pub const REMINDER_MINUTES: [u32; 2] = [24 * 60, 7 * 24 * 60];

/// Recurrence rule attached to every created event.
pub const YEARLY_RRULE: &str = "RRULE:FREQ=YEARLY";

/// One row read from a source: a display name and a `DD/MM` date string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub raw_date: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, raw_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_date: raw_date.into(),
        }
    }
}

/// What a source row celebrates. Only affects the event title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Birthday,
    Anniversary,
}

impl EventKind {
    fn title_suffix(self) -> &'static str {
        match self {
            EventKind::Birthday => "'s birthday",
            EventKind::Anniversary => "'s anniversary",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Birthday => write!(f, "birthday"),
            EventKind::Anniversary => write!(f, "anniversary"),
        }
    }
}

/// Canonical event title for a name. The title is the dedup key.
pub fn derive_title(name: &str, kind: EventKind) -> String {
    format!("{}{}", name, kind.title_suffix())
}

/// An all-day, yearly, private, transparent event ready to be created.
///
/// The fixed parts of the shape (recurrence, reminders, visibility) live in
/// the gateway; this only carries what varies per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDate,
    /// Exclusive end, always `start + 1 day`.
    pub end: NaiveDate,
}

impl CalendarEvent {
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Snapshot of the yearly events already in the calendar, keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingEventIndex {
    by_title: HashMap<String, String>,
}

impl ExistingEventIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a title. A later insert for the same title replaces the id.
    pub fn insert(&mut self, title: impl Into<String>, id: impl Into<String>) {
        let title = title.into();
        let id = id.into();
        if let Some(previous) = self.by_title.insert(title.clone(), id) {
            tracing::debug!("Duplicate calendar title {:?}, replacing id {}", title, previous);
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.by_title.contains_key(title)
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.by_title.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

impl<T: Into<String>, I: Into<String>> FromIterator<(T, I)> for ExistingEventIndex {
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        let mut index = Self::new();
        for (title, id) in iter {
            index.insert(title, id);
        }
        index
    }
}
