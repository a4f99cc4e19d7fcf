use crate::domain::model::Record;
use crate::domain::ports::WorkbookReader;
use crate::utils::error::{MigrateError, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Reads the first sheet of an `.xlsx` workbook (or a `.csv` export of it)
/// into header-keyed rows. The first row is the header row; empty cells stay
/// absent from the row map, matching how the legacy sheets were consumed.
#[derive(Debug, Clone, Default)]
pub struct FileWorkbookReader;

impl FileWorkbookReader {
    pub fn new() -> Self {
        Self
    }

    fn read_spreadsheet(&self, path: &Path) -> Result<Vec<Record>> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| MigrateError::validation("workbook has no sheets"))??;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = header_row.iter().map(header_label).collect();

        let mut records = Vec::new();
        for row in rows {
            let mut data = HashMap::new();
            for (header, cell) in headers.iter().zip(row) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = cell_value(cell) {
                    data.insert(header.clone(), value);
                }
            }
            if !data.is_empty() {
                records.push(Record::new(data));
            }
        }
        Ok(records)
    }

    fn read_csv(&self, path: &Path) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let mut data = HashMap::new();
            for (header, field) in headers.iter().zip(row.iter()) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = field_value(field) {
                    data.insert(header.clone(), value);
                }
            }
            if !data.is_empty() {
                records.push(Record::new(data));
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl WorkbookReader for FileWorkbookReader {
    async fn read_rows(&self, path: &Path) -> Result<Vec<Record>> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            self.read_csv(path)
        } else {
            self.read_spreadsheet(path)
        }
    }
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        _ => String::new(),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Value::String(trimmed.to_string()))
            }
        }
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Date cells keep their serial form; the phase logic converts them.
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

/// CSV fields carry no cell types, so numeric-looking fields are promoted to
/// numbers to match what a spreadsheet decoder would produce.
fn field_value(field: &str) -> Option<Value> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return serde_json::Number::from_f64(f).map(Value::Number);
    }
    Some(Value::String(trimmed.to_string()))
}
