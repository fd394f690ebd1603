//! Birthday and anniversary sync: data model, reconciler and shared plumbing.

pub mod config;
pub mod dates;
pub mod error;
pub mod gateway;
pub mod model;
pub mod retry;
pub mod sync;

pub use config::{Config, GoogleConfig, SourcesConfig, ValidationResult};
pub use error::SyncError;
pub use gateway::{CalendarGateway, DryRun, EntrySource};
pub use model::{derive_title, CalendarEvent, Entry, EventKind, ExistingEventIndex};
pub use sync::{SourceSpec, SyncReport, SyncStats};

use anyhow::Result;

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::debug!("datesync core initialized");
    Ok(())
}
