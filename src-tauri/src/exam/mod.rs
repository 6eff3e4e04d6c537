//! Exam records and the normalizer that builds them from timetable rows.

pub mod types;
pub mod dates;
pub mod normalizer;

pub use types::*;
pub use dates::{parse_date, parse_date_text};
pub use normalizer::{missing_columns, normalize, EXPECTED_COLUMNS};
