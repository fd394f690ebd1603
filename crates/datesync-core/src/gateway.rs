//! Seams to the two external services a sync talks to.

use anyhow::Result;

use crate::model::{CalendarEvent, Entry, ExistingEventIndex};

/// Read access to named two-column sources (sheets).
#[allow(async_fn_in_trait)]
pub trait EntrySource {
    /// Rows of the named source in row order, or `None` if it does not exist.
    async fn read_entries(&self, source_name: &str) -> Result<Option<Vec<Entry>>>;
}

/// The calendar backend, restricted to the two calls a sync needs.
#[allow(async_fn_in_trait)]
pub trait CalendarGateway {
    /// All yearly events whose start falls in `year`, keyed by title.
    async fn list_existing(&self, year: i32) -> Result<ExistingEventIndex>;

    /// Create one event. Returns the backend id.
    async fn create_event(&self, event: &CalendarEvent) -> Result<String>;
}

/// Wraps a gateway so listings are real but creations are only logged.
pub struct DryRun<G> {
    inner: G,
}

impl<G: CalendarGateway> DryRun<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

impl<G: CalendarGateway> CalendarGateway for DryRun<G> {
    async fn list_existing(&self, year: i32) -> Result<ExistingEventIndex> {
        self.inner.list_existing(year).await
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<String> {
        tracing::info!(
            "[dry run] Would create {:?} on {} (yearly)",
            event.title,
            event.start_date()
        );
        Ok(String::from("dry-run"))
    }
}
