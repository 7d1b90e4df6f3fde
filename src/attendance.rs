use crate::model::{AttendanceStatus, StudentRecord, SubjectEntry};
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_DATE_RECORDED: &str = "No date recorded";

/// Per-status tally for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    #[serde(rename = "no class today")]
    pub no_class_today: u32,
}

impl StatusCounts {
    fn bump(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::NoClassToday => self.no_class_today += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.no_class_today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub subject: String,
    pub status: AttendanceStatus,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub id: u64,
    pub name: String,
    pub attendance: Vec<EntryView>,
    pub total_attendance: BTreeMap<String, StatusCounts>,
}

/// Count every entry exactly once under its subject and status.
///
/// A subject gets a zeroed row the first time it is seen, so a subject with
/// no entries never shows up.
pub fn tally(entries: &[SubjectEntry]) -> BTreeMap<String, StatusCounts> {
    let mut totals: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for e in entries {
        totals.entry(e.sname.clone()).or_default().bump(e.status);
    }
    totals
}

pub fn summarize(record: &StudentRecord) -> AttendanceSummary {
    let attendance = record
        .subjects
        .iter()
        .map(|e| EntryView {
            subject: e.sname.clone(),
            status: e.status,
            date: e
                .date
                .clone()
                .unwrap_or_else(|| NO_DATE_RECORDED.to_string()),
        })
        .collect();

    AttendanceSummary {
        id: record.id,
        name: record.name.clone(),
        attendance,
        total_attendance: tally(&record.subjects),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttendanceStatus::{Absent, NoClassToday, Present};
    use serde_json::json;

    fn student(entries: Vec<SubjectEntry>) -> StudentRecord {
        StudentRecord {
            id: 2,
            name: "Jane Smith".into(),
            student_id: 124,
            subjects: entries,
        }
    }

    #[test]
    fn five_entry_example_tallies_per_subject() {
        let rec = student(vec![
            SubjectEntry::new("Math", Present),
            SubjectEntry::new("Math", Present),
            SubjectEntry::new("Science", Absent),
            SubjectEntry::new("Science", Present),
            SubjectEntry::new("Cs", Present),
        ]);
        let summary = summarize(&rec);
        let totals = serde_json::to_value(&summary.total_attendance).expect("serialize");
        assert_eq!(
            totals,
            json!({
                "Math": { "present": 2, "absent": 0, "no class today": 0 },
                "Science": { "present": 1, "absent": 1, "no class today": 0 },
                "Cs": { "present": 1, "absent": 0, "no class today": 0 }
            })
        );
    }

    #[test]
    fn bucket_sums_match_entry_counts() {
        let statuses = [Present, Absent, NoClassToday, Present, Absent, Present, Present];
        let subjects = ["Math", "Art", "Math", "Cs", "Art", "Math", "Cs"];
        let entries: Vec<SubjectEntry> = subjects
            .iter()
            .zip(statuses.iter())
            .map(|(s, st)| SubjectEntry::new(*s, *st))
            .collect();
        let totals = tally(&entries);

        for (subject, counts) in &totals {
            let n = entries.iter().filter(|e| &e.sname == subject).count() as u32;
            assert_eq!(counts.total(), n, "subject {}", subject);
        }
        let grand: u32 = totals.values().map(StatusCounts::total).sum();
        assert_eq!(grand as usize, entries.len());
        assert_eq!(totals["Math"].no_class_today, 1);
    }

    #[test]
    fn per_entry_view_keeps_order_and_fills_missing_dates() {
        let rec = student(vec![
            SubjectEntry::on("Math", Present, "2025-03-05"),
            SubjectEntry::new("Cs", Absent),
        ]);
        let summary = summarize(&rec);
        assert_eq!(summary.attendance[0].date, "2025-03-05");
        assert_eq!(summary.attendance[1].subject, "Cs");
        assert_eq!(summary.attendance[1].date, NO_DATE_RECORDED);
    }

    #[test]
    fn empty_record_has_no_totals() {
        let summary = summarize(&student(Vec::new()));
        assert!(summary.attendance.is_empty());
        assert!(summary.total_attendance.is_empty());
    }
}
