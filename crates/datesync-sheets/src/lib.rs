//! Google Sheets source reader for datesync.
//!
//! Reads two-column (name, `DD/MM`) sheets and optionally sorts them first.

pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use client::SheetsClient;
pub use error::SheetsError;
pub use source::SheetsSource;
pub use types::SheetProperties;
