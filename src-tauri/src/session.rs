use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::calendar::{build_grid, is_weekend, CalendarGrid, FilterOption, QualificationFilter, YearMonth};
use crate::config::CalendarConfig;
use crate::exam::ExamRecord;
use crate::ingest::{FileLoad, UploadReport};
use crate::store::ExamStore;

/// The day picked for the detail panel and its exams under the active filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub date: NaiveDate,
    pub exams: Vec<ExamRecord>,
}

/// What happened to one file of a selection, as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub id: Uuid,
    pub file_name: String,
    pub success: bool,
    pub records_added: usize,
    pub report: Option<UploadReport>,
    pub error: Option<String>,
}

/// Serializable snapshot of everything the calendar view renders
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub month: YearMonth,
    pub title: String,
    pub filter: QualificationFilter,
    pub grid: CalendarGrid,
    pub selection: Option<Selection>,
    pub total_records: usize,
    pub visible_records: usize,
}

/// Calendar view state plus the records it draws from.
///
/// Every UI action maps to one method; each is a complete state transition.
#[derive(Debug, Clone)]
pub struct CalendarSession {
    store: ExamStore,
    cursor: YearMonth,
    filter: QualificationFilter,
    selection: Option<Selection>,
    checksums: HashSet<String>,
}

impl CalendarSession {
    pub fn new(initial_month: YearMonth) -> Self {
        CalendarSession {
            store: ExamStore::new(),
            cursor: initial_month,
            filter: QualificationFilter::All,
            selection: None,
            checksums: HashSet::new(),
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::new(config.initial_month)
    }

    pub fn store(&self) -> &ExamStore {
        &self.store
    }

    pub fn cursor(&self) -> YearMonth {
        self.cursor
    }

    pub fn filter(&self) -> &QualificationFilter {
        &self.filter
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Append records to the store, returning how many were added
    pub fn add_records(&mut self, records: Vec<ExamRecord>) -> usize {
        let added = self.store.add_records(records);
        self.refresh_selection();
        added
    }

    /// Merge a selection's loads in order; failed files add nothing
    pub fn apply_loads(&mut self, loads: Vec<FileLoad>) -> Vec<UploadOutcome> {
        loads.into_iter().map(|load| self.apply_load(load)).collect()
    }

    fn apply_load(&mut self, load: FileLoad) -> UploadOutcome {
        match load.result {
            Ok(loaded) => {
                if !self.checksums.insert(loaded.report.checksum.clone()) {
                    tracing::warn!(file = %load.file_name, "workbook was already loaded; its exams are added again");
                }

                let records_added = self.store.add_records(loaded.records);
                self.refresh_selection();

                UploadOutcome {
                    id: loaded.report.id,
                    file_name: load.file_name,
                    success: true,
                    records_added,
                    report: Some(loaded.report),
                    error: None,
                }
            }
            Err(e) => UploadOutcome {
                id: Uuid::new_v4(),
                file_name: load.file_name,
                success: false,
                records_added: 0,
                report: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Change the active filter; a selection is re-derived under it and
    /// cleared when none of its exams remain visible.
    pub fn set_filter(&mut self, filter: QualificationFilter) {
        self.filter = filter;
        self.refresh_selection();
    }

    pub fn next_month(&mut self) -> YearMonth {
        self.cursor = self.cursor.next();
        self.cursor
    }

    pub fn prev_month(&mut self) -> YearMonth {
        self.cursor = self.cursor.prev();
        self.cursor
    }

    pub fn go_to(&mut self, month: YearMonth) {
        self.cursor = month;
    }

    /// Grid of the cursor month under the active filter
    pub fn grid(&self) -> CalendarGrid {
        build_grid(self.cursor, self.store.all_records(), &self.filter)
    }

    /// Select `day` of the cursor month for the detail panel.
    ///
    /// Returns false, leaving the selection untouched, when the day does not
    /// exist, falls on a weekend or has no visible exams.
    pub fn select_day(&mut self, day: u32) -> bool {
        let Some(date) = self.cursor.date(day) else {
            return false;
        };
        // weekends have no grid cell
        if is_weekend(date.weekday()) {
            return false;
        }

        let exams = self.exams_on(date);
        if exams.is_empty() {
            return false;
        }

        self.selection = Some(Selection { date, exams });
        true
    }

    /// `base` followed by every loaded qualification it does not already cover
    pub fn filter_options(&self, base: &[FilterOption]) -> Vec<FilterOption> {
        let mut options = base.to_vec();
        for qualification in self.store.qualifications() {
            if !options.iter().any(|option| option.value == qualification) {
                options.push(FilterOption::new(qualification, qualification));
            }
        }
        options
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn view(&self) -> CalendarView {
        let grid = self.grid();
        CalendarView {
            month: self.cursor,
            title: grid.title.clone(),
            filter: self.filter.clone(),
            grid,
            selection: self.selection.clone(),
            total_records: self.store.len(),
            visible_records: self.store.records_matching(&self.filter).len(),
        }
    }

    fn exams_on(&self, date: NaiveDate) -> Vec<ExamRecord> {
        self.store
            .records_matching(&self.filter)
            .into_iter()
            .filter(|record| record.date.valid() == Some(date))
            .cloned()
            .collect()
    }

    fn refresh_selection(&mut self) {
        if let Some(date) = self.selection.as_ref().map(|s| s.date) {
            let exams = self.exams_on(date);
            self.selection = (!exams.is_empty()).then_some(Selection { date, exams });
        }
    }
}

impl Default for CalendarSession {
    fn default() -> Self {
        Self::new(YearMonth::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamDate;
    use crate::excel::ExcelError;
    use crate::ingest::{IngestError, LoadedWorkbook};

    const BTEC: &str = "RQF BTEC National";

    fn exam(day: u32, qualification: &str, subject: &str) -> ExamRecord {
        let mut record = ExamRecord::new(NaiveDate::from_ymd_opt(2025, 5, day).unwrap(), qualification);
        record.subject = subject.to_string();
        record
    }

    fn session_with_may_exams() -> CalendarSession {
        let mut session = CalendarSession::default();
        session.add_records(vec![
            exam(12, "GCSE", "Maths"),
            exam(12, BTEC, "Business"),
            exam(12, "GCSE", "English"),
        ]);
        session
    }

    fn loaded(file_name: &str, checksum: &str, records: Vec<ExamRecord>) -> FileLoad {
        FileLoad {
            file_name: file_name.to_string(),
            result: Ok(LoadedWorkbook {
                report: UploadReport {
                    id: Uuid::new_v4(),
                    file_name: file_name.to_string(),
                    checksum: checksum.to_string(),
                    sheet: "All papers".to_string(),
                    rows_read: records.len(),
                    records: records.len(),
                    invalid_dates: 0,
                    missing_columns: Vec::new(),
                },
                records,
            }),
        }
    }

    #[test]
    fn test_select_day_under_filters() {
        let mut session = session_with_may_exams();
        assert!(session.select_day(12));
        assert_eq!(session.selection().unwrap().exams.len(), 3);

        let grid = session.grid();
        let summary = &grid.day(12).unwrap().summary;
        assert_eq!(summary.len(), 2);
        assert_eq!((summary[0].qualification.as_str(), summary[0].count), ("GCSE", 2));
        assert_eq!((summary[1].qualification.as_str(), summary[1].count), (BTEC, 1));

        session.set_filter(QualificationFilter::only("GCSE"));
        assert!(session.select_day(12));
        let selection = session.selection().unwrap();
        assert_eq!(selection.exams.len(), 2);
        assert!(selection.exams.iter().all(|e| e.qualification == "GCSE"));

        let grid = session.grid();
        let summary = &grid.day(12).unwrap().summary;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].count, 2);
    }

    #[test]
    fn test_selecting_empty_day_keeps_selection() {
        let mut session = session_with_may_exams();
        assert!(session.select_day(12));
        let before = session.selection().cloned();

        assert!(!session.select_day(13));
        assert!(!session.select_day(10)); // Saturday
        assert!(!session.select_day(32));
        assert_eq!(session.selection().cloned(), before);
    }

    #[test]
    fn test_weekend_exams_cannot_be_selected() {
        let mut session = CalendarSession::default();
        session.add_records(vec![exam(10, "GCSE", "Saturday sitting"), exam(11, BTEC, "Sunday sitting")]);
        assert!(session.grid().day(10).is_none());

        assert!(!session.select_day(10));
        assert!(!session.select_day(11));
        assert!(session.selection().is_none());

        session.add_records(vec![exam(12, "GCSE", "Maths")]);
        assert!(session.select_day(12));
        assert!(!session.select_day(10));
        assert_eq!(session.selection().unwrap().date, NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());
    }

    #[test]
    fn test_go_to_keeps_selection() {
        let mut session = session_with_may_exams();
        assert!(session.select_day(12));

        session.go_to(YearMonth::new(1999, 12).unwrap());
        assert_eq!(session.cursor(), YearMonth::new(1999, 12).unwrap());
        assert_eq!(session.grid().title, "December 1999");
        assert_eq!(session.next_month(), YearMonth::new(2000, 1).unwrap());
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_filter_options_include_loaded_qualifications() {
        let mut session = session_with_may_exams();
        session.add_records(vec![exam(13, "A Level", "Chemistry"), exam(14, "GCSE", "Physics")]);

        let base = crate::calendar::default_filter_options();
        let options = session.filter_options(&base);
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["ALL", "GCSE", BTEC, "A Level"]);
        assert_eq!(options[3].label, "A Level");
        assert_eq!(options[2].label, "BTEC");

        assert_eq!(CalendarSession::default().filter_options(&base), base);
    }

    #[test]
    fn test_filter_change_rederives_selection() {
        let mut session = session_with_may_exams();
        session.set_filter(QualificationFilter::only(BTEC));
        assert!(session.select_day(12));
        assert_eq!(session.selection().unwrap().exams.len(), 1);

        session.set_filter(QualificationFilter::All);
        assert_eq!(session.selection().unwrap().exams.len(), 3);

        session.set_filter(QualificationFilter::only("A Level"));
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_navigation() {
        let mut session = CalendarSession::new(YearMonth::new(2025, 1).unwrap());
        assert_eq!(session.prev_month(), YearMonth::new(2024, 12).unwrap());
        for _ in 0..12 {
            session.next_month();
        }
        assert_eq!(session.cursor(), YearMonth::new(2025, 12).unwrap());
    }

    #[test]
    fn test_failed_load_contributes_nothing() {
        let mut session = CalendarSession::default();
        let outcomes = session.apply_loads(vec![
            loaded("a.xlsx", "aaa", vec![exam(12, "GCSE", "Maths"), exam(13, "GCSE", "Physics")]),
            FileLoad {
                file_name: "b.xlsx".to_string(),
                result: Err(IngestError::Excel(ExcelError::sheet_not_found("All papers"))),
            },
            loaded("c.xlsx", "ccc", vec![exam(14, BTEC, "Business")]),
        ]);

        assert_eq!(session.store().len(), 3);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success && outcomes[2].success);
        assert!(!outcomes[1].success);
        assert_eq!(outcomes[1].records_added, 0);
        assert!(outcomes[1].error.as_deref().unwrap().contains("All papers"));
        // merged in selection order
        assert_eq!(session.store().all_records()[2].subject, "Business");
    }

    #[test]
    fn test_reloading_same_workbook_appends_again() {
        let mut session = CalendarSession::default();
        session.apply_loads(vec![loaded("a.xlsx", "same", vec![exam(12, "GCSE", "Maths")])]);
        session.apply_loads(vec![loaded("a.xlsx", "same", vec![exam(12, "GCSE", "Maths")])]);
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_new_records_refresh_selection() {
        let mut session = session_with_may_exams();
        assert!(session.select_day(12));
        session.add_records(vec![exam(12, "GCSE", "History")]);
        assert_eq!(session.selection().unwrap().exams.len(), 4);
    }

    #[test]
    fn test_view_counts() {
        let mut session = session_with_may_exams();
        let mut invalid = exam(12, "GCSE", "Unknown date");
        invalid.date = ExamDate::Invalid("TBC".to_string());
        session.add_records(vec![invalid]);
        session.set_filter(QualificationFilter::only("GCSE"));

        let view = session.view();
        assert_eq!(view.title, "May 2025");
        assert_eq!(view.total_records, 4);
        assert_eq!(view.visible_records, 3);
        assert_eq!(view.grid.total_exams(), 2);
    }
}
