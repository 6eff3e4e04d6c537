//! Calendar grid engine: month arithmetic, qualification filtering and the
//! weekday-only (Mon–Fri) month grid.

pub mod month;
pub mod filter;
pub mod grid;

pub use month::{days_in_month, is_leap_year, is_weekend, weekday_of, InvalidMonth, YearMonth};
pub use filter::{default_filter_options, FilterOption, QualificationFilter, ALL_VALUE};
pub use grid::{build_grid, summarize, CalendarGrid, DayCell, GridCell, QualificationCount, WEEKDAY_HEADERS};
