//! Load a spreadsheet into ordered records
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) are read through calamine, first
//! worksheet only. CSV files are read with the csv crate and their cells typed
//! by inference. The first row is always the header.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::value::CellValue;
use crate::error::{ImportError, ImportResult};

/// A loaded sheet: header plus typed data rows
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Column names; `None` for columns with an empty header cell
    columns: Vec<Option<String>>,
    /// Data rows with their 1-based sheet row number
    rows: Vec<(usize, Vec<CellValue>)>,
}

/// One data row, fields in header order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based sheet row number (the header is the row before the first record)
    pub row: usize,
    pub fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Look up a field by column name
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

impl Sheet {
    /// Open a spreadsheet file
    pub fn open<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let sheet = if extension == "csv" {
            read_csv(path)?
        } else {
            read_workbook(path)?
        };

        log::info!(
            "Loaded {} with {} columns and {} data rows",
            path.display(),
            sheet.headers().len(),
            sheet.rows.len()
        );
        Ok(sheet)
    }

    /// Build a sheet from a header row and data rows already in memory
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: dedupe_headers(headers.into_iter().map(Some).collect()),
            rows: number_rows(1, rows),
        }
    }

    /// Column names in sheet order, exactly as written in the header
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().flatten().map(|s| s.as_str()).collect()
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate records from the first data row. Each call starts over.
    pub fn records(&self) -> Records<'_> {
        Records {
            sheet: self,
            next: 0,
        }
    }

    fn record_at(&self, index: usize) -> Record {
        let (number, row) = &self.rows[index];
        let fields = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(col, name)| {
                let name = name.as_ref()?;
                let value = row.get(col).cloned().unwrap_or_default();
                Some((name.clone(), value))
            })
            .collect();

        Record {
            row: *number,
            fields,
        }
    }
}

/// Lazy record iterator over a [`Sheet`]
pub struct Records<'a> {
    sheet: &'a Sheet,
    next: usize,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.next >= self.sheet.rows.len() {
            return None;
        }
        let record = self.sheet.record_at(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sheet.rows.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

fn read_workbook(path: &Path) -> ImportResult<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        ImportError::Format(format!("failed to open {}: {}", path.display(), e))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Format(format!("{} has no sheets", path.display())))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Format(format!("failed to read sheet {}: {}", sheet_name, e)))?;

    log::debug!("Reading sheet '{}' from {}", sheet_name, path.display());

    // calamine ranges start at the first used cell, not at A1
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows = range.rows();

    let columns = match rows.next() {
        Some(header) => dedupe_headers(header.iter().map(header_name).collect()),
        None => Vec::new(),
    };

    let rows = rows
        .map(|r| r.iter().map(cell_to_value).collect::<Vec<_>>())
        .collect();

    Ok(Sheet {
        columns,
        rows: number_rows(header_row, rows),
    })
}

fn read_csv(path: &Path) -> ImportResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError::Format(format!("failed to open {}: {}", path.display(), e)))?;

    let header = reader
        .headers()
        .map_err(|e| ImportError::Format(format!("invalid CSV header: {}", e)))?
        .clone();
    let columns = dedupe_headers(
        header
            .iter()
            .map(|h| if h.is_empty() { None } else { Some(h.to_string()) })
            .collect(),
    );

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::Format(format!("invalid CSV row: {}", e)))?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    Ok(Sheet {
        columns,
        rows: number_rows(1, rows),
    })
}

fn header_name(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(cell_to_value(other).to_string()).filter(|s| !s.is_empty()),
    }
}

/// Repeated header names get a `.1`, `.2`, ... suffix so every field stays addressable
fn dedupe_headers(columns: Vec<Option<String>>) -> Vec<Option<String>> {
    let mut seen: Vec<String> = Vec::new();
    columns
        .into_iter()
        .map(|column| {
            let name = column?;
            let mut unique = name.clone();
            let mut n = 1;
            while seen.contains(&unique) {
                unique = format!("{}.{}", name, n);
                n += 1;
            }
            seen.push(unique.clone());
            Some(unique)
        })
        .collect()
}

/// Attach sheet row numbers, then drop rows with no content
fn number_rows(header_row: usize, rows: Vec<Vec<CellValue>>) -> Vec<(usize, Vec<CellValue>)> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| (header_row + i + 1, row))
        .filter(|(_, row)| !is_blank(row))
        .collect()
}

fn is_blank(row: &[CellValue]) -> bool {
    row.iter().all(|c| match c {
        CellValue::Null => true,
        CellValue::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Convert a workbook cell to a typed value
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::from_number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) if !dt.is_duration() => CellValue::DateTime(naive),
            _ => CellValue::from_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}
