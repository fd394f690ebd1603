//! Error types for a sync run.
//!
//! Every variant here aborts the run. Failures that only affect a single
//! calendar call (listing, one creation) never become a `SyncError`; they are
//! logged where they happen and the run carries on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A source row carried a date that is not a `DD/MM` pair in range.
    #[error("Invalid date format: {0:?} (expected DD/MM)")]
    InvalidDateFormat(String),

    /// The named source exists but could not be read.
    #[error("Failed to read source {source_name}: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// The local clock gave a year with no representable 1 January.
    #[error("Cannot anchor dates to year {0}")]
    InvalidAnchorYear(i32),
}

impl SyncError {
    /// Short, actionable message for the run log.
    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::InvalidDateFormat(_) => {
                "A row in the spreadsheet has a malformed date. Fix it and re-run."
            }
            SyncError::SourceUnavailable { .. } => {
                "The spreadsheet could not be read. Check access and try again."
            }
            SyncError::InvalidAnchorYear(_) => "The system clock looks wrong.",
        }
    }
}
