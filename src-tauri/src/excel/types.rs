use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Information about a sheet in a workbook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetInfo {
    pub name: String,
    pub index: u32,
}

/// Represents a cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    /// ISO 8601 duration text, kept verbatim
    Duration(String),
    Error(String),
}

impl CellValue {
    /// True for cells that carry no usable content: empty cells and blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// One data row of a sheet, keyed by the header text of its column.
///
/// Empty cells are not stored, so a missing key means the cell was empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based row number in the source sheet
    pub row_number: u32,
    pub cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(row_number: u32) -> Self {
        RawRow {
            row_number,
            cells: HashMap::new(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header-keyed contents of a single sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetRows {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Excel-specific errors
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ExcelError {
    pub message: String,
    pub error_type: ExcelErrorType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExcelErrorType {
    FileNotFound,
    InvalidFormat,
    SheetNotFound,
    ReadError,
}

impl ExcelError {
    pub fn new(message: impl Into<String>, error_type: ExcelErrorType) -> Self {
        ExcelError {
            message: message.into(),
            error_type,
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        ExcelError::new(format!("File not found: {}", path), ExcelErrorType::FileNotFound)
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::InvalidFormat)
    }

    pub fn sheet_not_found(sheet: &str) -> Self {
        ExcelError::new(
            format!("Could not find \"{}\" sheet", sheet),
            ExcelErrorType::SheetNotFound,
        )
    }

    pub fn read_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::ReadError)
    }

    pub fn is_sheet_not_found(&self) -> bool {
        self.error_type == ExcelErrorType::SheetNotFound
    }
}
