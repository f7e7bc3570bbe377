//! Spreadsheet to Segment importer
//!
//! Reads rows from a workbook or CSV file, maps each row to a Segment `track`
//! event and sends the events one by one or in batches.

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod import;
pub mod mapper;
pub mod sheet;

pub use api::{DryRunSink, EventSink, SegmentClient, TrackEvent};
pub use config::{ApiConfig, DispatchMode, ImportConfig, MappingConfig, TraitsMode, WriteKey};
pub use error::{ImportError, ImportResult};
pub use import::{RunSummary, import_sheet, run_import};
pub use sheet::{CellValue, Record, Sheet};
