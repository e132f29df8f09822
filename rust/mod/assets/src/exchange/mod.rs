//! CSV export and import for assets and inventory.
//!
//! Export writes a header row and one quoted-as-needed line per record.
//! Import is partial-success: each data row is validated on its own, bad
//! rows are reported as `"Row {n}: {message}"` (counting the header as row
//! 1) and skipped, and the remaining rows are returned for committing.

mod assets;
mod inventory;

use std::collections::{BTreeMap, HashSet};

use assettrack_core::ServiceError;
use serde::Serialize;

pub use assets::{ASSET_HEADERS, export_assets, parse_asset_rows};
pub use inventory::{INVENTORY_HEADERS, export_inventory, parse_inventory_rows};

/// Rows accepted from an import, and one message per rejected row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport<T> {
    pub rows: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> Default for ImportReport<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

fn csv_err(e: ::csv::Error) -> ServiceError {
    ServiceError::Internal(format!("csv: {}", e))
}

/// Serialize `rows` under `headers`.
fn write_csv(
    headers: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<String, ServiceError> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_err)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(format!("csv: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Internal(format!("csv: {}", e)))
}

/// One data row, addressed by header name.
struct CsvRow<'a> {
    columns: &'a BTreeMap<String, usize>,
    record: ::csv::StringRecord,
}

impl CsvRow<'_> {
    /// Trimmed cell value; blank and missing cells are `None`.
    fn get(&self, header: &str) -> Option<&str> {
        let index = *self.columns.get(&header.to_lowercase())?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn required(&self, header: &str) -> Result<&str, String> {
        self.get(header).ok_or_else(|| format!("{} is required", header))
    }

    fn number(&self, header: &str) -> Result<Option<f64>, String> {
        self.get(header)
            .map(|v| {
                v.replace(',', "")
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .ok_or_else(|| format!("{} '{}' is not a valid amount", header, v))
            })
            .transpose()
    }

    fn count(&self, header: &str) -> Result<u32, String> {
        let v = self.required(header)?;
        v.parse::<u32>()
            .map_err(|_| format!("{} '{}' is not a whole number", header, v))
    }
}

/// Parse `text`, check that every `required` header is present, and hand
/// each data row with its 1-based line number (header = 1) to `parse_row`.
///
/// `next_id` is called for rows without an ID, with the number of records
/// already known (existing plus accepted so far). A row whose ID is already
/// taken is rejected; the first occurrence wins.
fn import_rows<T>(
    text: &str,
    required: &[&str],
    existing_ids: HashSet<String>,
    next_id: impl Fn(usize) -> String,
    id_of: impl Fn(&T) -> &str,
    mut parse_row: impl FnMut(&CsvRow<'_>, String, &[T]) -> Result<T, String>,
) -> Result<ImportReport<T>, ServiceError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ServiceError::Validation(format!("unreadable CSV header: {}", e)))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ServiceError::Validation("CSV file is empty".into()));
    }
    let columns: BTreeMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|h| !columns.contains_key(&h.to_lowercase()))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::Validation(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let existing_count = existing_ids.len();
    let mut taken = existing_ids;
    let mut report = ImportReport::default();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                report.errors.push(format!("Row {}: {}", line, e));
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = CsvRow {
            columns: &columns,
            record,
        };
        let id = match row.get("ID") {
            Some(id) => id.to_string(),
            None => next_id(existing_count + report.rows.len()),
        };
        if taken.contains(&id) {
            report
                .errors
                .push(format!("Row {}: duplicate ID '{}'", line, id));
            continue;
        }
        match parse_row(&row, id, &report.rows) {
            Ok(parsed) => {
                taken.insert(id_of(&parsed).to_string());
                report.rows.push(parsed);
            }
            Err(message) => report.errors.push(format!("Row {}: {}", line, message)),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_doubled() {
        let out = write_csv(
            &["Name", "Notes"],
            vec![vec!["Chair, oak".to_string(), "Says \"hi\"".to_string()]],
        )
        .unwrap();
        assert_eq!(out, "Name,Notes\r\n\"Chair, oak\",\"Says \"\"hi\"\"\"\r\n");
    }

    #[test]
    fn missing_columns_fail_whole_file() {
        let err = import_rows::<String>(
            "Name,Color\nx,y\n",
            &["Name", "Category"],
            HashSet::new(),
            |n| format!("X{}", n + 1),
            |s| s.as_str(),
            |_, id, _| Ok(id),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "missing required column(s): Category");

        let empty = import_rows::<String>(
            "",
            &["Name"],
            HashSet::new(),
            |n| n.to_string(),
            |s| s.as_str(),
            |_, id, _| Ok(id),
        );
        assert!(empty.is_err());
    }

    #[test]
    fn ids_are_generated_and_deduplicated() {
        let existing: HashSet<String> = ["X1".to_string()].into();
        let report = import_rows::<String>(
            "ID,Name\n,first\nX9,second\nX9,third\n,fourth\n\n",
            &["Name"],
            existing,
            |n| format!("X{}", n + 1),
            |s| s.as_str(),
            |_, id, _| Ok(id),
        )
        .unwrap();
        // count = 1 existing → X2; then X9; then duplicate; then 1 + 2 accepted → X4.
        assert_eq!(report.rows, vec!["X2", "X9", "X4"]);
        assert_eq!(report.errors, vec!["Row 4: duplicate ID 'X9'"]);
    }
}
