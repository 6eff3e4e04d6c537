use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use super::types::*;

/// Excel epoch for the 1900 date system
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Read a sheet from a workbook on disk into header-keyed rows
pub fn read_sheet(path: &Path, sheet: &str) -> Result<SheetRows, ExcelError> {
    if !path.exists() {
        return Err(ExcelError::file_not_found(&path.display().to_string()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ExcelError::read_error(format!("Failed to open workbook: {}", e)))?;

    rows_from_workbook(&mut workbook, sheet)
}

/// Read a sheet from an in-memory workbook (an uploaded file's bytes)
pub fn read_sheet_from_bytes(bytes: &[u8], sheet: &str) -> Result<SheetRows, ExcelError> {
    let mut workbook = open_bytes(bytes)?;
    rows_from_workbook(&mut workbook, sheet)
}

/// Get list of sheets in a workbook on disk
pub fn get_sheets(path: &Path) -> Result<Vec<SheetInfo>, ExcelError> {
    if !path.exists() {
        return Err(ExcelError::file_not_found(&path.display().to_string()));
    }

    let workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ExcelError::read_error(format!("Failed to open workbook: {}", e)))?;

    Ok(sheet_infos(&workbook))
}

/// Get list of sheets in an in-memory workbook
pub fn get_sheets_from_bytes(bytes: &[u8]) -> Result<Vec<SheetInfo>, ExcelError> {
    let workbook = open_bytes(bytes)?;
    Ok(sheet_infos(&workbook))
}

/// Compute SHA-256 checksum of a file's bytes
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn open_bytes(bytes: &[u8]) -> Result<Sheets<Cursor<Vec<u8>>>, ExcelError> {
    open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ExcelError::invalid_format(format!("Not a readable workbook: {}", e)))
}

fn sheet_infos<RS: Read + Seek>(workbook: &Sheets<RS>) -> Vec<SheetInfo> {
    workbook
        .sheet_names()
        .iter()
        .enumerate()
        .map(|(index, name)| SheetInfo {
            name: name.clone(),
            index: index as u32,
        })
        .collect()
}

fn rows_from_workbook<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: &str,
) -> Result<SheetRows, ExcelError> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(ExcelError::sheet_not_found(sheet));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| ExcelError::read_error(format!("Failed to read sheet '{}': {}", sheet, e)))?;

    let (headers, rows) = rows_from_range(&range);

    tracing::debug!(sheet, columns = headers.len(), rows = rows.len(), "read sheet");

    Ok(SheetRows {
        sheet: sheet.to_string(),
        headers,
        rows,
    })
}

/// Split a range into its header row and the header-keyed data rows below it.
///
/// Empty cells are omitted and fully blank rows are skipped.
fn rows_from_range(range: &Range<Data>) -> (Vec<String>, Vec<RawRow>) {
    let start_row = range.start().map(|(row, _)| row).unwrap_or(0);
    let mut iter = range.rows();

    let headers = match iter.next() {
        Some(header_cells) => header_names(header_cells),
        None => return (Vec::new(), Vec::new()),
    };

    let mut rows = Vec::new();
    for (idx, cells) in iter.enumerate() {
        // +1 for the header row, +1 for 1-based numbering
        let mut row = RawRow::new(start_row + idx as u32 + 2);

        for (col_idx, cell) in cells.iter().enumerate() {
            let value = convert_cell_value(cell);
            if value.is_blank() {
                continue;
            }
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.clone(), value);
            }
        }

        if !row.is_empty() {
            rows.push(row);
        }
    }

    (headers, rows)
}

/// Header text for each column; blank headers fall back to the column letter
/// and repeated headers get a numeric suffix so every key stays unique.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, u32> = HashMap::new();

    cells
        .iter()
        .enumerate()
        .map(|(col_idx, cell)| {
            let base = match convert_cell_value(cell) {
                CellValue::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                CellValue::Number(n) => display_number(n),
                _ => column_index_to_letter(col_idx as u32),
            };

            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Convert calamine Data to our CellValue
fn convert_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::String(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Duration(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Convert an Excel serial date (days since 1899-12-30) to a date-time.
///
/// Returns `None` for non-finite values and serials outside chrono's range.
pub fn excel_serial_to_datetime(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }

    let days = value.floor();
    if days.abs() > 100_000_000.0 {
        return None;
    }

    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_signed(Duration::days(days as i64))?;

    let total_seconds = ((value - days) * 86400.0).round() as u32;
    // A fraction that rounds up to a full day stays on the same date at 23:59:59
    let total_seconds = total_seconds.min(86_399);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(total_seconds, 0)?;

    Some(NaiveDateTime::new(date, time))
}

/// Render a number the way spreadsheet exports show it: integral values
/// without a decimal point.
pub fn display_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Convert column index (0-based) to Excel column letter (A, B, ..., Z, AA, AB, ...)
fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}
