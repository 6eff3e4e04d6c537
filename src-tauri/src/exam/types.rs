use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Qualification used when a row leaves the "Qual" column empty
pub const UNKNOWN_QUALIFICATION: &str = "Unknown";

/// Calendar date of an exam as parsed from the source sheet.
///
/// Malformed source values are carried as `Invalid` with their raw text so a
/// row is never lost just because its date could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExamDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl ExamDate {
    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            ExamDate::Valid(date) => Some(*date),
            ExamDate::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ExamDate::Valid(_))
    }

    /// True when this is a valid date equal to (year, month, day)
    pub fn falls_on(&self, year: i32, month: u32, day: u32) -> bool {
        match self {
            ExamDate::Valid(date) => date.year() == year && date.month() == month && date.day() == day,
            ExamDate::Invalid(_) => false,
        }
    }
}

impl From<NaiveDate> for ExamDate {
    fn from(date: NaiveDate) -> Self {
        ExamDate::Valid(date)
    }
}

/// One scheduled or windowed examination entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub date: ExamDate,
    pub exam_series: String,
    pub board: String,
    pub qualification: String,
    pub exam_code: String,
    pub subject: String,
    pub title: String,
    pub time: String,
    pub duration: String,
    pub level: Option<String>,
    pub unit: Option<String>,
    pub part: Option<String>,
    pub window_start: Option<ExamDate>,
    pub window_end: Option<ExamDate>,
    pub additional_info: Option<String>,
}

impl ExamRecord {
    /// Minimal record with every free-text field empty
    pub fn new(date: impl Into<ExamDate>, qualification: impl Into<String>) -> Self {
        ExamRecord {
            date: date.into(),
            exam_series: String::new(),
            board: String::new(),
            qualification: qualification.into(),
            exam_code: String::new(),
            subject: String::new(),
            title: String::new(),
            time: String::new(),
            duration: String::new(),
            level: None,
            unit: None,
            part: None,
            window_start: None,
            window_end: None,
            additional_info: None,
        }
    }

    pub fn is_window_exam(&self) -> bool {
        self.window_start.is_some() || self.window_end.is_some()
    }
}

/// What to do with rows whose dates cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// Keep the row with an invalid date; it never lands on a calendar day
    #[default]
    Lenient,
    /// Fail the whole file on the first unparseable date
    Strict,
    /// Skip rows whose "Date" cannot be parsed
    Drop,
}

/// Field order for numeric dates such as `05/12/2025`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

/// Options controlling row normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub date_mode: DateMode,
    pub day_order: DayOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("row {row}: cannot read \"{column}\" value '{value}' as a date")]
    MalformedRow {
        row: u32,
        column: String,
        value: String,
    },
}
