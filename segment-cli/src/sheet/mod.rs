//! Spreadsheet loading
//!
//! A [`Sheet`] holds the header and typed rows of the first worksheet (or of a
//! CSV file) and hands them out one [`Record`] at a time, in sheet order.

mod reader;
mod value;

pub use reader::{Record, Records, Sheet};
pub use value::CellValue;
