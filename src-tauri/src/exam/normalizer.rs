use chrono::{NaiveDate, NaiveTime};

use super::dates::parse_date;
use super::types::*;
use crate::excel::{display_number, CellValue, RawRow};

pub const COL_DATE: &str = "Date";
pub const COL_EXAM_SERIES: &str = "Exam series";
pub const COL_BOARD: &str = "Board";
pub const COL_QUAL: &str = "Qual";
pub const COL_EXAM_CODE: &str = "Examination code";
pub const COL_SUBJECT: &str = "Subject";
pub const COL_TITLE: &str = "Title";
pub const COL_TIME: &str = "Time";
pub const COL_DURATION: &str = "Duration";
pub const COL_LEVEL: &str = "Level";
pub const COL_UNIT: &str = "Unit";
pub const COL_PART: &str = "Part";
pub const COL_WINDOW_START: &str = "Window start";
pub const COL_WINDOW_END: &str = "Window end";
pub const COL_ADDITIONAL_INFO: &str = "Additional information";

/// Columns a timetable export is expected to carry
pub const EXPECTED_COLUMNS: [&str; 15] = [
    COL_DATE,
    COL_EXAM_SERIES,
    COL_BOARD,
    COL_QUAL,
    COL_EXAM_CODE,
    COL_SUBJECT,
    COL_TITLE,
    COL_TIME,
    COL_DURATION,
    COL_LEVEL,
    COL_UNIT,
    COL_PART,
    COL_WINDOW_START,
    COL_WINDOW_END,
    COL_ADDITIONAL_INFO,
];

/// Expected columns absent from a header row, in `EXPECTED_COLUMNS` order
pub fn missing_columns(headers: &[String]) -> Vec<&'static str> {
    EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|expected| !headers.iter().any(|h| h == expected))
        .collect()
}

/// Convert header-keyed rows into exam records, preserving row order.
///
/// Only `DateMode::Strict` can fail; the other modes always produce a record
/// list (possibly shorter than the input under `DateMode::Drop`).
pub fn normalize(
    rows: &[RawRow],
    options: &NormalizeOptions,
) -> Result<Vec<ExamRecord>, NormalizeError> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(record) = normalize_row(row, options)? {
            records.push(record);
        }
    }

    Ok(records)
}

fn normalize_row(
    row: &RawRow,
    options: &NormalizeOptions,
) -> Result<Option<ExamRecord>, NormalizeError> {
    let date = parse_date(row.get(COL_DATE).unwrap_or(&CellValue::Empty), options.day_order);

    if let ExamDate::Invalid(raw) = &date {
        match options.date_mode {
            DateMode::Strict => return Err(malformed(row, COL_DATE, raw)),
            DateMode::Drop => {
                tracing::warn!(row = row.row_number, value = %raw, "dropping row with unreadable date");
                return Ok(None);
            }
            DateMode::Lenient => {
                tracing::debug!(row = row.row_number, value = %raw, "keeping row with unreadable date");
            }
        }
    }

    let window_start = window_date(row, COL_WINDOW_START, options)?;
    let window_end = window_date(row, COL_WINDOW_END, options)?;

    Ok(Some(ExamRecord {
        date,
        exam_series: text(row, COL_EXAM_SERIES),
        board: text(row, COL_BOARD),
        qualification: qualification(row),
        exam_code: text(row, COL_EXAM_CODE),
        subject: text(row, COL_SUBJECT),
        title: text(row, COL_TITLE),
        time: text(row, COL_TIME),
        duration: text(row, COL_DURATION),
        level: optional_text(row, COL_LEVEL),
        unit: optional_text(row, COL_UNIT),
        part: optional_text(row, COL_PART),
        window_start,
        window_end,
        additional_info: optional_text(row, COL_ADDITIONAL_INFO),
    }))
}

fn malformed(row: &RawRow, column: &str, value: &str) -> NormalizeError {
    NormalizeError::MalformedRow {
        row: row.row_number,
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Window dates exist only when the column holds a truthy value
fn window_date(
    row: &RawRow,
    column: &str,
    options: &NormalizeOptions,
) -> Result<Option<ExamDate>, NormalizeError> {
    let Some(cell) = row.get(column).filter(|cell| is_truthy(cell)) else {
        return Ok(None);
    };

    let date = parse_date(cell, options.day_order);
    if let ExamDate::Invalid(raw) = &date {
        if options.date_mode == DateMode::Strict {
            return Err(malformed(row, column, raw));
        }
    }

    Ok(Some(date))
}

fn qualification(row: &RawRow) -> String {
    match row.get(COL_QUAL).filter(|cell| is_truthy(cell)) {
        Some(cell) => cell_text(cell),
        None => UNKNOWN_QUALIFICATION.to_string(),
    }
}

/// Falsy cells: empty, blank text, zero/NaN numbers, `false`
fn is_truthy(cell: &CellValue) -> bool {
    match cell {
        CellValue::Empty => false,
        CellValue::String(s) => !s.is_empty(),
        CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
        CellValue::Boolean(b) => *b,
        _ => true,
    }
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).map(cell_text).unwrap_or_default()
}

fn optional_text(row: &RawRow, column: &str) -> Option<String> {
    row.get(column)
        .filter(|cell| !cell.is_blank())
        .map(cell_text)
}

/// Render a cell as display text, verbatim where the source is text
fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::String(s) => s.clone(),
        CellValue::Number(n) => display_number(*n),
        CellValue::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        CellValue::DateTime(dt) => {
            if is_time_only(dt.date()) {
                dt.format("%H:%M").to_string()
            } else if dt.time() == NaiveTime::MIN {
                dt.format("%Y-%m-%d").to_string()
            } else {
                dt.format("%Y-%m-%d %H:%M").to_string()
            }
        }
        CellValue::Duration(s) => s.clone(),
        CellValue::Error(e) => format!("#{}", e),
    }
}

/// Time-formatted cells carry serial values below 1, i.e. the epoch date
fn is_time_only(date: NaiveDate) -> bool {
    NaiveDate::from_ymd_opt(1899, 12, 30) == Some(date)
}
