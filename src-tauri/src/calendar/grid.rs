use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use super::filter::QualificationFilter;
use super::month::{is_weekend, weekday_of, YearMonth};
use crate::exam::ExamRecord;

/// The grid only shows weekday columns
pub const COLUMNS: usize = 5;
pub const WEEKDAY_HEADERS: [&str; COLUMNS] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Number of exams of one qualification on a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationCount {
    pub qualification: String,
    pub count: usize,
}

/// A weekday of the month with the exams that fall on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    pub day: u32,
    pub weekday: Weekday,
    pub exams: Vec<ExamRecord>,
    pub summary: Vec<QualificationCount>,
}

impl DayCell {
    pub fn has_exams(&self) -> bool {
        !self.exams.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

/// Renderable month grid: leading blanks followed by one cell per weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub title: String,
    pub headers: [String; COLUMNS],
    pub leading_blanks: usize,
    pub days: Vec<DayCell>,
}

impl CalendarGrid {
    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days.iter().find(|cell| cell.day == day)
    }

    /// Cells in display order
    pub fn cells(&self) -> Vec<GridCell> {
        std::iter::repeat(GridCell::Blank)
            .take(self.leading_blanks)
            .chain(self.days.iter().cloned().map(GridCell::Day))
            .collect()
    }

    /// Cells split into rows of five, the last row padded with blanks
    pub fn rows(&self) -> Vec<Vec<GridCell>> {
        let mut rows: Vec<Vec<GridCell>> = self
            .cells()
            .chunks(COLUMNS)
            .map(|chunk| chunk.to_vec())
            .collect();

        if let Some(last) = rows.last_mut() {
            last.resize(COLUMNS, GridCell::Blank);
        }

        rows
    }

    pub fn total_exams(&self) -> usize {
        self.days.iter().map(|cell| cell.exams.len()).sum()
    }
}

/// Build the weekday-only grid of `month` for the records passing `filter`
pub fn build_grid(
    month: YearMonth,
    records: &[ExamRecord],
    filter: &QualificationFilter,
) -> CalendarGrid {
    let days_in_month = month.days();

    // Bucket the visible records of this month by day number, keeping order
    let mut by_day: Vec<Vec<ExamRecord>> = vec![Vec::new(); days_in_month as usize + 1];
    for record in records.iter().filter(|r| filter.matches(r)) {
        if let Some(date) = record.date.valid() {
            if month.contains(date) {
                by_day[date.day() as usize].push(record.clone());
            }
        }
    }

    let mut days = Vec::new();
    for day in 1..=days_in_month {
        let weekday = weekday_of(month.year(), month.month(), day);
        if is_weekend(weekday) {
            continue;
        }

        let exams = std::mem::take(&mut by_day[day as usize]);
        let summary = summarize(&exams);
        days.push(DayCell {
            day,
            weekday,
            exams,
            summary,
        });
    }

    CalendarGrid {
        month,
        title: month.title(),
        headers: WEEKDAY_HEADERS.map(String::from),
        leading_blanks: month.first_weekday_offset(),
        days,
    }
}

/// Count exams per qualification in first-seen order
pub fn summarize(exams: &[ExamRecord]) -> Vec<QualificationCount> {
    let mut summary: Vec<QualificationCount> = Vec::new();

    for exam in exams {
        match summary
            .iter_mut()
            .find(|entry| entry.qualification == exam.qualification)
        {
            Some(entry) => entry.count += 1,
            None => summary.push(QualificationCount {
                qualification: exam.qualification.clone(),
                count: 1,
            }),
        }
    }

    summary
}
