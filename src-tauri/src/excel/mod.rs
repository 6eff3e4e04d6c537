//! Excel module for reading timetable workbooks.
//!
//! This module provides:
//! - Opening `.xlsx`/`.xls` workbooks from disk or from uploaded bytes
//! - Locating a named sheet and turning it into header-keyed rows
//! - Excel serial date conversion and upload fingerprints

pub mod types;
pub mod reader;

// Re-export commonly used types and functions
pub use types::*;
pub use reader::{
    compute_checksum, display_number, excel_serial_to_datetime, get_sheets, get_sheets_from_bytes,
    read_sheet, read_sheet_from_bytes,
};
