//! [`EntrySource`] backed by one Google spreadsheet.

use anyhow::{Context, Result};
use datesync_core::{Entry, EntrySource};

use crate::client::SheetsClient;
use crate::types::{rows_to_entries, two_column_range};

pub struct SheetsSource {
    client: SheetsClient,
    spreadsheet_id: String,
    sort_on_read: bool,
}

impl SheetsSource {
    pub fn new(
        client: SheetsClient,
        spreadsheet_id: impl Into<String>,
        sort_on_read: bool,
    ) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            sort_on_read,
        }
    }
}

impl EntrySource for SheetsSource {
    async fn read_entries(&self, source_name: &str) -> Result<Option<Vec<Entry>>> {
        let sheet = self
            .client
            .find_sheet(&self.spreadsheet_id, source_name)
            .await
            .context("Failed to load spreadsheet metadata")?;

        let Some(sheet) = sheet else {
            return Ok(None);
        };

        // Sorting only tidies the sheet for whoever edits it.
        if self.sort_on_read {
            if let Err(e) = self
                .client
                .sort_by_first_column(&self.spreadsheet_id, sheet.sheet_id)
                .await
            {
                tracing::warn!("Could not sort sheet {}: {}", source_name, e);
            }
        }

        let rows = self
            .client
            .get_values(&self.spreadsheet_id, &two_column_range(source_name))
            .await
            .with_context(|| format!("Failed to read values of sheet {}", source_name))?;

        Ok(Some(rows_to_entries(&rows)))
    }
}
