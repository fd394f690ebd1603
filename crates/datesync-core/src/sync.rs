//! The diff-and-create run: list what exists, then create what is missing.

use std::ops::AddAssign;

use crate::dates::derive_event_dates;
use crate::error::SyncError;
use crate::gateway::{CalendarGateway, EntrySource};
use crate::model::{derive_title, CalendarEvent, Entry, EventKind, ExistingEventIndex};

/// A named source and the kind of event its rows become.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub kind: EventKind,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Counters for one reconciled batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AddAssign for SyncStats {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Outcome of a whole run, one line per source.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub existing: usize,
    pub sources: Vec<(SourceSpec, SyncStats)>,
}

impl SyncReport {
    pub fn total(&self) -> SyncStats {
        let mut total = SyncStats::default();
        for (_, stats) in &self.sources {
            total += *stats;
        }
        total
    }
}

/// Snapshot the calendar for `year`.
///
/// A failed listing is logged and treated as an empty calendar, so the run
/// still creates events (possibly duplicating ones it could not see).
pub async fn load_existing<G: CalendarGateway>(gateway: &G, year: i32) -> ExistingEventIndex {
    match gateway.list_existing(year).await {
        Ok(index) => {
            tracing::info!("Found {} existing yearly events in {}", index.len(), year);
            index
        }
        Err(e) => {
            tracing::error!("Failed to list existing events for {}: {:#}", year, e);
            ExistingEventIndex::new()
        }
    }
}

/// Entries of one source. A missing source is not an error.
pub async fn read_source<S: EntrySource>(
    source: &S,
    source_name: &str,
) -> Result<Vec<Entry>, SyncError> {
    match source.read_entries(source_name).await {
        Ok(Some(entries)) => {
            tracing::debug!("Read {} rows from {}", entries.len(), source_name);
            Ok(entries)
        }
        Ok(None) => {
            tracing::info!("Source {} not found, skipping", source_name);
            Ok(Vec::new())
        }
        Err(e) => Err(SyncError::SourceUnavailable {
            source_name: source_name.to_string(),
            message: format!("{:#}", e),
        }),
    }
}

/// Create an event for every entry whose title is not in `existing`.
///
/// A malformed date aborts the batch. A failed creation is logged and the
/// remaining entries are still attempted. Every attempted title is added to
/// `existing`, so a title is attempted at most once per run.
pub async fn reconcile<G: CalendarGateway>(
    entries: &[Entry],
    kind: EventKind,
    existing: &mut ExistingEventIndex,
    gateway: &G,
    anchor_year: i32,
) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();

    for entry in entries {
        let title = derive_title(&entry.name, kind);

        if existing.contains(&title) {
            tracing::debug!("{:?} already exists, skipping", title);
            stats.skipped += 1;
            continue;
        }

        let (start, end) = derive_event_dates(&entry.raw_date, anchor_year)?;
        let event = CalendarEvent { title, start, end };

        match gateway.create_event(&event).await {
            Ok(id) => {
                tracing::info!("Created {:?} on {} ({})", event.title, event.start_date(), id);
                stats.created += 1;
                existing.insert(event.title, id);
            }
            Err(e) => {
                tracing::error!("Failed to create {:?}: {:#}", event.title, e);
                stats.failed += 1;
                existing.insert(event.title, String::new());
            }
        }
    }

    Ok(stats)
}

/// One full sync: a single listing, then each source in order.
pub async fn run<S, G>(
    source: &S,
    gateway: &G,
    sources: &[SourceSpec],
    anchor_year: i32,
) -> Result<SyncReport, SyncError>
where
    S: EntrySource,
    G: CalendarGateway,
{
    let mut existing = load_existing(gateway, anchor_year).await;
    let mut report = SyncReport {
        existing: existing.len(),
        sources: Vec::with_capacity(sources.len()),
    };

    for spec in sources {
        let entries = read_source(source, &spec.name).await?;
        let stats = reconcile(&entries, spec.kind, &mut existing, gateway, anchor_year).await?;
        tracing::info!(
            "{}: {} created, {} already present, {} failed",
            spec.name,
            stats.created,
            stats.skipped,
            stats.failed
        );
        report.sources.push((spec.clone(), stats));
    }

    Ok(report)
}
