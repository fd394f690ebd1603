//! [`CalendarGateway`] backed by Google Calendar.
//!
//! Both [`EventKind`](datesync_core::EventKind)s are written as Google's
//! `birthday` event type and listed back by that type. The kind is not stored
//! anywhere in the backend; it only shaped the title.

use anyhow::{Context, Result};
use datesync_core::dates::year_window;
use datesync_core::{CalendarEvent, CalendarGateway, ExistingEventIndex};

use crate::client::CalendarClient;
use crate::types::{NewBirthdayEvent, BIRTHDAY_EVENT_TYPE};

/// Guard against a backend that keeps handing out page tokens.
const MAX_PAGES: usize = 100;

pub struct GoogleCalendarGateway {
    client: CalendarClient,
    calendar_id: String,
}

impl GoogleCalendarGateway {
    pub fn new(client: CalendarClient, calendar_id: impl Into<String>) -> Self {
        Self {
            client,
            calendar_id: calendar_id.into(),
        }
    }
}

impl CalendarGateway for GoogleCalendarGateway {
    async fn list_existing(&self, year: i32) -> Result<ExistingEventIndex> {
        let (time_min, time_max) = year_window(year)?;
        let mut index = ExistingEventIndex::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let resp = self
                .client
                .list_events(
                    &self.calendar_id,
                    time_min,
                    time_max,
                    BIRTHDAY_EVENT_TYPE,
                    page_token.as_deref(),
                )
                .await
                .with_context(|| format!("Listing events page {} failed", page + 1))?;

            for event in resp.items {
                match event.summary {
                    Some(title) => index.insert(title, event.id),
                    None => tracing::debug!("Ignoring untitled event {}", event.id),
                }
            }

            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(index),
            }
        }

        tracing::warn!("Stopped listing after {} pages", MAX_PAGES);
        Ok(index)
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<String> {
        let body = NewBirthdayEvent::from(event);
        let created = self
            .client
            .create_event(&self.calendar_id, &body)
            .await
            .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;

        if let Some(link) = &created.html_link {
            tracing::info!("{:?} is at {}", event.title, link);
        }
        Ok(created.id)
    }
}
