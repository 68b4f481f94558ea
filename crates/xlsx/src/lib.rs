//! XLSX spreadsheet export of slide design reports.

pub mod strings;
pub mod writer;

pub use writer::{ReportWorkbook, DEFAULT_SHEET_NAME};
