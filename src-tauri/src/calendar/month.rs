use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A month of a specific year; the navigation cursor of the calendar.
///
/// Years are plain proleptic Gregorian integers with no lower or upper bound,
/// so navigation never stops at year 1 or chrono's supported range.
///
/// The month is always in 1..=12, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("month {0} is out of range (expected 1-12)")]
pub struct InvalidMonth(pub u32);

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = InvalidMonth;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        YearMonth::new(raw.year, raw.month).ok_or(InvalidMonth(raw.month))
    }
}

impl YearMonth {
    /// `month` is 1-based; returns `None` outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// 1-based month number
    pub fn month(self) -> u32 {
        self.month
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year.saturating_add(1),
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            YearMonth {
                year: self.year.saturating_sub(1),
                month: 12,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Date of `day` in this month, when chrono can represent it
    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Leading blank cells before day 1 in the weekday-only grid:
    /// Monday=0 … Friday=4, with Saturday and Sunday both mapped to 4.
    pub fn first_weekday_offset(self) -> usize {
        match weekday_of(self.year, self.month, 1) {
            Weekday::Sat | Weekday::Sun => 4,
            weekday => weekday.num_days_from_monday() as usize,
        }
    }

    /// Human-readable title such as "May 2025"
    pub fn title(self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Default for YearMonth {
    /// May 2025, the start of the summer exam series
    fn default() -> Self {
        YearMonth { year: 2025, month: 5 }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Gregorian day count of a month; `month` is 1-based
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Weekday of a proleptic Gregorian date, valid for any year
pub fn weekday_of(year: i32, month: u32, day: u32) -> Weekday {
    const OFFSETS: [i64; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

    let mut y = year as i64;
    if month < 3 {
        y -= 1;
    }
    let index = (month.clamp(1, 12) - 1) as usize;
    let days = y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400) + OFFSETS[index] + day as i64;

    // 0 = Sunday
    match days.rem_euclid(7) {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_days_in_month_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_year_rollover() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2025, 1).unwrap());

        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.prev(), YearMonth::new(2024, 12).unwrap());
    }

    #[test]
    fn test_navigation_before_year_one() {
        let jan = YearMonth::new(1, 1).unwrap();
        assert_eq!(jan.prev(), YearMonth::new(0, 12).unwrap());
        assert_eq!(jan.prev().prev().next().next(), jan);
        assert_eq!(YearMonth::new(0, 1).unwrap().prev().year(), -1);
    }

    #[test]
    fn test_first_weekday_offset() {
        // May 2025 starts on a Thursday
        assert_eq!(YearMonth::new(2025, 5).unwrap().first_weekday_offset(), 3);
        // September 2025 starts on a Monday
        assert_eq!(YearMonth::new(2025, 9).unwrap().first_weekday_offset(), 0);
        // March 2025 starts on a Saturday, June 2025 on a Sunday
        assert_eq!(YearMonth::new(2025, 3).unwrap().first_weekday_offset(), 4);
        assert_eq!(YearMonth::new(2025, 6).unwrap().first_weekday_offset(), 4);
    }

    #[test]
    fn test_title_and_display() {
        let may = YearMonth::new(2025, 5).unwrap();
        assert_eq!(may.title(), "May 2025");
        assert_eq!(may.to_string(), "2025-05");
    }

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
    }

    #[test]
    fn test_deserialize_validates_month() {
        let may: YearMonth = serde_json::from_str(r#"{"year":2025,"month":5}"#).unwrap();
        assert_eq!(may, YearMonth::new(2025, 5).unwrap());
        assert_eq!(serde_json::to_string(&may).unwrap(), r#"{"year":2025,"month":5}"#);

        let err = serde_json::from_str::<YearMonth>(r#"{"year":2025,"month":13}"#).unwrap_err();
        assert!(err.to_string().contains("month 13"));
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2025,"month":0}"#).is_err());
    }

    proptest! {
        #[test]
        fn days_in_month_matches_chrono(year in -5000i32..5000, month in 1u32..=12) {
            let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let next = YearMonth::new(year, month).unwrap().next();
            let next_first = NaiveDate::from_ymd_opt(next.year(), next.month(), 1).unwrap();
            prop_assert_eq!(days_in_month(year, month) as i64, (next_first - first).num_days());
        }

        #[test]
        fn weekday_matches_chrono(year in -5000i32..5000, month in 1u32..=12, day in 1u32..=28) {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            prop_assert_eq!(weekday_of(year, month, day), date.weekday());
        }

        #[test]
        fn twelve_steps_forward_is_one_year(year in -100_000i32..100_000, month in 1u32..=12) {
            let start = YearMonth::new(year, month).unwrap();
            let end = (0..12).fold(start, |ym, _| ym.next());
            prop_assert_eq!(end, YearMonth::new(year + 1, month).unwrap());
            let back = (0..12).fold(end, |ym, _| ym.prev());
            prop_assert_eq!(back, start);
        }
    }
}
