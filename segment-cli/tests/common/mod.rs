#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use segment_cli::config::{ApiConfig, DispatchMode, ImportConfig, MappingConfig, WriteKey};
use serde_json::Value;
use wiremock::MockServer;

pub const WRITE_KEY: &str = "test-write-key";

/// A cell to write into a fixture workbook
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Date(&'static str),
    Empty,
}

/// Write a single-sheet workbook with a header row
pub fn write_workbook(dir: &Path, name: &str, headers: &[&str], rows: &[Vec<Cell>]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(r, c, *s).unwrap();
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n).unwrap();
                }
                Cell::Date(s) => {
                    let dt = ExcelDateTime::parse_from_str(s).unwrap();
                    worksheet.write_datetime_with_format(r, c, &dt, &date_format).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save(&path).unwrap();
    path
}

/// `rows` numbered rows of `userId`, `event`, `plan`, `seats`
pub fn numbered_workbook(dir: &Path, rows: usize) -> PathBuf {
    let data: Vec<Vec<Cell>> = (0..rows)
        .map(|i| {
            vec![
                Cell::Number(i as f64 + 1.0),
                Cell::Text("Plan Changed"),
                Cell::Text("pro"),
                Cell::Number(2.0),
            ]
        })
        .collect();
    write_workbook(dir, "rows.xlsx", &["userId", "event", "plan", "seats"], &data)
}

pub fn config(server: &MockServer, mapping: MappingConfig, dispatch: DispatchMode) -> ImportConfig {
    ImportConfig {
        mapping,
        dispatch,
        api: ApiConfig::new(
            server.uri(),
            WriteKey::resolve(Some(WRITE_KEY.to_string()), None),
        ),
        dry_run: false,
    }
}

/// JSON bodies of every request the server received, in order
pub async fn bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
