//! Google Calendar integration for datesync.
//!
//! Provides the Calendar API client and the gateway the reconciler talks to.

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use gateway::GoogleCalendarGateway;
pub use types::{ApiEvent, EventListResponse, NewBirthdayEvent};
