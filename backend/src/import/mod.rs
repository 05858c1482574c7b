//! CSV import into the movie store.
//!
//! Every data row is validated on its own with the CSV row schema. Good rows
//! are inserted, bad rows are reported with their messages; a bad row never
//! stops the batch. Only a missing required column (or an unparsable body)
//! aborts the import before any row is touched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ImportError, ImportResult};
use crate::models::Movie;
use crate::parser::{missing_columns, parse_bytes, CsvRow, ParsedCsv};
use crate::store::MovieStore;
use crate::validation::{as_integer, schemas, validate, ValidationOptions};

/// Columns an import file must carry.
pub const REQUIRED_COLUMNS: [&str; 2] = ["title", "year"];

/// A rejected row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    /// 1-based position among the non-blank data rows. The header and any
    /// blank line are not counted, so this is not the line number in the file.
    pub row: usize,
    /// The row as read from the file.
    pub data: Map<String, Value>,
    pub errors: Vec<String>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub imported: Vec<Movie>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Imported: {} of {} rows, {} failed",
            self.successful, self.total_rows, self.failed
        )
    }
}

/// Parse `bytes` and import every valid row into `store`.
pub fn import_csv(store: &mut MovieStore, bytes: &[u8]) -> ImportResult<ImportReport> {
    let parsed = parse_bytes(bytes)?;
    import_parsed(store, &parsed)
}

/// Import already parsed rows. Checks the header first.
pub fn import_parsed(store: &mut MovieStore, parsed: &ParsedCsv) -> ImportResult<ImportReport> {
    let required: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let missing = missing_columns(&parsed.headers, &required);
    if !missing.is_empty() {
        return Err(ImportError::HeaderMismatch { missing });
    }

    let mut report = ImportReport {
        total_rows: parsed.rows.len(),
        ..ImportReport::default()
    };

    for row in &parsed.rows {
        match validate_row(row) {
            Ok((title, year)) => {
                let movie = store.insert(title, year);
                report.successful += 1;
                report.imported.push(movie);
            }
            Err(errors) => {
                report.failed += 1;
                report.errors.push(RowError {
                    row: row.row,
                    data: row.values.clone(),
                    errors,
                });
            }
        }
    }

    Ok(report)
}

/// Validate one row, returning the cleaned title and year or every message.
pub fn validate_row(row: &CsvRow) -> Result<(String, i32), Vec<String>> {
    let payload: Map<String, Value> = row
        .values
        .iter()
        .filter(|(_, v)| v.as_str().map_or(true, |s| !s.trim().is_empty()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let data = validate(&schemas::csv_row_schema(), &payload, ValidationOptions::whitelist())
        .map_err(|failure| failure.messages())?;

    let title = data
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    let year = data
        .get("year")
        .and_then(as_integer)
        .and_then(|y| i32::try_from(y).ok());

    match (title, year) {
        (Some(title), Some(year)) => Ok((title, year)),
        (None, _) => Err(vec![schemas::TITLE_REQUIRED.to_string()]),
        (_, None) => Err(vec![schemas::YEAR_OUT_OF_RANGE.to_string()]),
    }
}
