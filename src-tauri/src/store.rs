use crate::calendar::QualificationFilter;
use crate::exam::ExamRecord;

/// Append-only collection of every exam record loaded in a session.
///
/// Records are never deduplicated or removed; loading the same timetable
/// twice doubles its entries.
#[derive(Debug, Default, Clone)]
pub struct ExamStore {
    records: Vec<ExamRecord>,
}

impl ExamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, returning how many records were added
    pub fn add_records(&mut self, records: impl IntoIterator<Item = ExamRecord>) -> usize {
        let before = self.records.len();
        self.records.extend(records);
        self.records.len() - before
    }

    pub fn all_records(&self) -> &[ExamRecord] {
        &self.records
    }

    /// Records passing `filter`, in load order
    pub fn records_matching(&self, filter: &QualificationFilter) -> Vec<&ExamRecord> {
        filter.apply(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct qualifications in first-seen order
    pub fn qualifications(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.qualification.as_str()) {
                seen.push(&record.qualification);
            }
        }
        seen
    }
}
