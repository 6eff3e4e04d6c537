use serde::{Deserialize, Serialize};

use crate::exam::ExamRecord;

/// Option value the UI uses for the show-all entry
pub const ALL_VALUE: &str = "ALL";

/// Which qualification the calendar currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "qualification", rename_all = "lowercase")]
pub enum QualificationFilter {
    #[default]
    All,
    Only(String),
}

impl QualificationFilter {
    pub fn only(qualification: impl Into<String>) -> Self {
        QualificationFilter::Only(qualification.into())
    }

    /// Parse a selector value: `"ALL"` is the show-all sentinel, anything else
    /// a qualification.
    pub fn from_value(value: &str) -> Self {
        if value == ALL_VALUE {
            QualificationFilter::All
        } else {
            QualificationFilter::Only(value.to_string())
        }
    }

    pub fn value(&self) -> &str {
        match self {
            QualificationFilter::All => ALL_VALUE,
            QualificationFilter::Only(q) => q,
        }
    }

    pub fn matches(&self, record: &ExamRecord) -> bool {
        match self {
            QualificationFilter::All => true,
            QualificationFilter::Only(q) => record.qualification == *q,
        }
    }

    /// Records passing this filter, in their original order
    pub fn apply<'a>(&self, records: &'a [ExamRecord]) -> Vec<&'a ExamRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// An entry of the qualification selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        FilterOption {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn filter(&self) -> QualificationFilter {
        QualificationFilter::from_value(&self.value)
    }
}

/// The fixed selector entries: all, GCSE and BTEC
pub fn default_filter_options() -> Vec<FilterOption> {
    vec![
        FilterOption::new("All Qualifications", ALL_VALUE),
        FilterOption::new("GCSE", "GCSE"),
        FilterOption::new("BTEC", "RQF BTEC National"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(qualification: &str, subject: &str) -> ExamRecord {
        let mut record = ExamRecord::new(NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(), qualification);
        record.subject = subject.to_string();
        record
    }

    #[test]
    fn test_filter_keeps_order() {
        let records = vec![
            record("GCSE", "Maths"),
            record("RQF BTEC National", "Business"),
            record("GCSE", "English"),
        ];

        let gcse = QualificationFilter::only("GCSE").apply(&records);
        let subjects: Vec<_> = gcse.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Maths", "English"]);

        let all = QualificationFilter::All.apply(&records);
        assert_eq!(all.len(), 3);
        assert!(all.iter().zip(&records).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(QualificationFilter::from_value("ALL"), QualificationFilter::All);
        assert_eq!(
            QualificationFilter::from_value("GCSE"),
            QualificationFilter::Only("GCSE".to_string())
        );
        assert_eq!(QualificationFilter::only("GCSE").value(), "GCSE");
    }

    #[test]
    fn test_default_options() {
        let options = default_filter_options();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].filter(), QualificationFilter::All);
        assert_eq!(options[2].filter(), QualificationFilter::only("RQF BTEC National"));
    }
}
