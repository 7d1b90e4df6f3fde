use crate::error::AttendError;
use crate::model::{AttendanceStatus, StudentRecord, SubjectEntry};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecorded {
    pub student: String,
    pub subject: String,
    pub status: AttendanceStatus,
    pub date: String,
}

/// Add subjects the student does not have yet, each as a dateless `present`
/// entry. Only names already on the record are skipped; a name repeated within
/// `names` is appended once per occurrence.
pub fn add_subjects<S: RecordStore + ?Sized>(
    store: &mut S,
    id: u64,
    names: &[String],
) -> Result<StudentRecord, AttendError> {
    let record = store.find(id)?.ok_or(AttendError::NotFound(id))?;

    let existing: HashSet<&str> = record.subjects.iter().map(|s| s.sname.as_str()).collect();
    let fresh: Vec<SubjectEntry> = names
        .iter()
        .filter(|name| !existing.contains(name.as_str()))
        .map(|name| SubjectEntry::new(name.clone(), AttendanceStatus::Present))
        .collect();

    if fresh.is_empty() {
        debug!(student = id, "no new subjects to add");
        return Ok(record);
    }

    info!(student = id, added = fresh.len(), "adding subjects");
    store
        .append_entries(id, &fresh)?
        .ok_or(AttendError::NotFound(id))
}

/// Append one dated entry. Earlier entries for the same subject and day are
/// left alone, so repeated calls stack up.
pub fn record_status<S: RecordStore + ?Sized>(
    store: &mut S,
    id: u64,
    subject: &str,
    status: AttendanceStatus,
    date: &str,
) -> Result<StatusRecorded, AttendError> {
    let entry = SubjectEntry::on(subject, status, date);
    let record = store
        .append_entries(id, std::slice::from_ref(&entry))?
        .ok_or(AttendError::NotFound(id))?;

    info!(student = id, subject, %status, date, "attendance recorded");
    Ok(StatusRecorded {
        student: record.name,
        subject: entry.sname,
        status,
        date: entry.date.unwrap_or_default(),
    })
}
