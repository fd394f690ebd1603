//! Sheets API types and row conversion.

use datesync_core::Entry;
use serde::{Deserialize, Serialize};

/// Spreadsheet metadata, limited to `sheets.properties`.
#[derive(Debug, Deserialize)]
pub struct SpreadsheetResponse {
    #[serde(default)]
    pub sheets: Vec<ApiSheet>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Response of `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Body of `spreadsheets.batchUpdate`.
#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<SortRangeRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRangeRequest {
    pub sort_range: SortRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRange {
    pub range: GridRange,
    pub sort_specs: Vec<SortSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_column_index: u32,
    pub end_column_index: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub dimension_index: u32,
    pub sort_order: String,
}

impl BatchUpdateRequest {
    /// Sort columns A:B of a whole sheet by column A, ascending.
    pub fn sort_by_first_column(sheet_id: i64) -> Self {
        Self {
            requests: vec![SortRangeRequest {
                sort_range: SortRange {
                    range: GridRange {
                        sheet_id,
                        start_column_index: 0,
                        end_column_index: 2,
                    },
                    sort_specs: vec![SortSpec {
                        dimension_index: 0,
                        sort_order: "ASCENDING".to_string(),
                    }],
                },
            }],
        }
    }
}

/// A1 range covering the two data columns of `sheet_title`.
pub fn two_column_range(sheet_title: &str) -> String {
    format!("'{}'!A:B", sheet_title.replace('\'', "''"))
}

fn cell_text(cell: Option<&serde_json::Value>) -> String {
    match cell {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Turn raw rows into entries, in row order. Blank rows are dropped.
pub fn rows_to_entries(rows: &[Vec<serde_json::Value>]) -> Vec<Entry> {
    rows.iter()
        .filter_map(|row| {
            let name = cell_text(row.first());
            let raw_date = cell_text(row.get(1));
            if name.is_empty() && raw_date.is_empty() {
                None
            } else {
                Some(Entry { name, raw_date })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_keep_order_and_drop_blanks() {
        let rows = vec![
            vec![json!("Zoe"), json!("05/12")],
            vec![],
            vec![json!(" "), json!("")],
            vec![json!(" Adam "), json!(" 01/01 ")],
        ];

        let entries = rows_to_entries(&rows);

        assert_eq!(
            entries,
            vec![Entry::new("Zoe", "05/12"), Entry::new("Adam", "01/01")]
        );
    }

    #[test]
    fn test_missing_date_cell_is_kept() {
        let rows = vec![vec![json!("Bob")]];
        assert_eq!(rows_to_entries(&rows), vec![Entry::new("Bob", "")]);
    }

    #[test]
    fn test_range_quotes_title() {
        assert_eq!(two_column_range("Birthdays"), "'Birthdays'!A:B");
        assert_eq!(two_column_range("Mum's list"), "'Mum''s list'!A:B");
    }

    #[test]
    fn test_sort_request_shape() {
        let body = serde_json::to_value(BatchUpdateRequest::sort_by_first_column(42)).unwrap();
        assert_eq!(
            body,
            json!({
                "requests": [{
                    "sortRange": {
                        "range": {"sheetId": 42, "startColumnIndex": 0, "endColumnIndex": 2},
                        "sortSpecs": [{"dimensionIndex": 0, "sortOrder": "ASCENDING"}]
                    }
                }]
            })
        );
    }
}
