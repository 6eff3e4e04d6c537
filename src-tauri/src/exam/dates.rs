use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use super::types::{DayOrder, ExamDate};
use crate::excel::{display_number, excel_serial_to_datetime, CellValue};

fn iso_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$").unwrap())
}

fn numeric_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4}|\d{2})$").unwrap())
}

fn leading_weekday() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
    })
}

fn ordinal_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap())
}

const LONG_FORMATS: [&str; 2] = ["%d %B %Y", "%B %d %Y"];

/// Best-effort coercion of a cell into an exam date
pub fn parse_date(value: &CellValue, order: DayOrder) -> ExamDate {
    match value {
        CellValue::DateTime(dt) => ExamDate::Valid(dt.date()),
        CellValue::Number(n) => match excel_serial_to_datetime(*n) {
            Some(dt) => ExamDate::Valid(dt.date()),
            None => ExamDate::Invalid(display_number(*n)),
        },
        CellValue::String(s) => match parse_date_text(s, order) {
            Some(date) => ExamDate::Valid(date),
            None => ExamDate::Invalid(s.clone()),
        },
        CellValue::Empty => ExamDate::Invalid(String::new()),
        CellValue::Boolean(b) => ExamDate::Invalid(b.to_string()),
        CellValue::Duration(s) | CellValue::Error(s) => ExamDate::Invalid(s.clone()),
    }
}

/// Parse the textual date forms found in timetable exports
pub fn parse_date_text(text: &str, order: DayOrder) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = iso_date().captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = numeric_date().captures(text) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        let (month, day) = match order {
            DayOrder::MonthFirst => (first, second),
            DayOrder::DayFirst => (second, first),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    parse_long_form(text)
}

fn parse_long_form(text: &str) -> Option<NaiveDate> {
    let stripped = leading_weekday().replace(text, "");
    let stripped = ordinal_suffix().replace_all(&stripped, "$1");
    let cleaned = stripped
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    LONG_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// Two-digit years follow the usual pivot: 00-49 → 2000s, 50-99 → 1900s
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    if text.len() == 2 {
        Some(if year < 50 { 2000 + year } else { 1900 + year })
    } else {
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_text() {
        assert_eq!(parse_date_text("2025-05-12", DayOrder::MonthFirst), Some(ymd(2025, 5, 12)));
        assert_eq!(
            parse_date_text("2025-05-12T09:00:00", DayOrder::MonthFirst),
            Some(ymd(2025, 5, 12))
        );
        assert_eq!(parse_date_text("2025-02-30", DayOrder::MonthFirst), None);
    }

    #[test]
    fn test_numeric_text_respects_day_order() {
        assert_eq!(parse_date_text("05/12/2025", DayOrder::MonthFirst), Some(ymd(2025, 5, 12)));
        assert_eq!(parse_date_text("12/05/2025", DayOrder::DayFirst), Some(ymd(2025, 5, 12)));
        assert_eq!(parse_date_text("12.05.25", DayOrder::DayFirst), Some(ymd(2025, 5, 12)));
        assert_eq!(parse_date_text("13/05/2025", DayOrder::MonthFirst), None);
    }

    #[test]
    fn test_long_form_text() {
        let expected = Some(ymd(2025, 5, 12));
        assert_eq!(parse_date_text("12 May 2025", DayOrder::MonthFirst), expected);
        assert_eq!(parse_date_text("Monday 12 May 2025", DayOrder::MonthFirst), expected);
        assert_eq!(parse_date_text("Mon, 12th May 2025", DayOrder::MonthFirst), expected);
        assert_eq!(parse_date_text("May 12, 2025", DayOrder::MonthFirst), expected);
        assert_eq!(parse_date_text("TBC", DayOrder::MonthFirst), None);
    }

    #[test]
    fn test_parse_cell_values() {
        let dt = NaiveDateTime::parse_from_str("2025-05-12 09:00", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(
            parse_date(&CellValue::DateTime(dt), DayOrder::MonthFirst),
            ExamDate::Valid(ymd(2025, 5, 12))
        );
        assert_eq!(
            parse_date(&CellValue::Number(45789.0), DayOrder::MonthFirst),
            ExamDate::Valid(ymd(2025, 5, 12))
        );
        assert_eq!(
            parse_date(&CellValue::String("TBC".to_string()), DayOrder::MonthFirst),
            ExamDate::Invalid("TBC".to_string())
        );
        assert_eq!(
            parse_date(&CellValue::Empty, DayOrder::MonthFirst),
            ExamDate::Invalid(String::new())
        );
    }
}
