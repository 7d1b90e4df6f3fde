//! Read/write operations exposed to the IPC layer.
//!
//! Each function takes the store explicitly and either returns a result or a
//! recoverable [`AttendError`]. Input is assumed validated by the caller.

use crate::attendance::{summarize, AttendanceSummary, StatusCounts};
use crate::error::AttendError;
use crate::model::{StudentRecord, SubjectEntry};
use crate::store::RecordStore;
use tracing::{debug, info};

pub fn list_students<S: RecordStore + ?Sized>(
    store: &S,
) -> Result<Vec<StudentRecord>, AttendError> {
    Ok(store.list()?)
}

pub fn create_student<S: RecordStore + ?Sized>(
    store: &mut S,
    name: &str,
    student_id: u64,
    subjects: Vec<SubjectEntry>,
) -> Result<StudentRecord, AttendError> {
    let id = store.allocate_id()?;
    let record = store.insert(StudentRecord {
        id,
        name: name.to_string(),
        student_id,
        subjects,
    })?;
    info!(student = id, "student created");
    Ok(record)
}

pub fn fetch_by_id<S: RecordStore + ?Sized>(
    store: &S,
    id: u64,
) -> Result<StudentRecord, AttendError> {
    store.find(id)?.ok_or(AttendError::NotFound(id))
}

pub fn delete_by_id<S: RecordStore + ?Sized>(
    store: &mut S,
    id: u64,
) -> Result<StudentRecord, AttendError> {
    let removed = store.remove_by_id(id)?.ok_or(AttendError::NotFound(id))?;
    info!(student = id, entries = removed.subjects.len(), "student deleted");
    Ok(removed)
}

pub fn summarize_by_id<S: RecordStore + ?Sized>(
    store: &S,
    id: u64,
) -> Result<AttendanceSummary, AttendError> {
    let summary = summarize(&fetch_by_id(store, id)?);
    debug!(
        student = id,
        subjects = summary.total_attendance.len(),
        entries = summary
            .total_attendance
            .values()
            .map(StatusCounts::total)
            .sum::<u32>(),
        "attendance summarized"
    );
    Ok(summary)
}

/// Records with their subjects narrowed to entries dated exactly `date`.
/// Records without a match are dropped.
pub fn list_by_date<S: RecordStore + ?Sized>(
    store: &S,
    date: &str,
) -> Result<Vec<StudentRecord>, AttendError> {
    let matched: Vec<StudentRecord> = store
        .list()?
        .into_iter()
        .filter_map(|mut rec| {
            rec.subjects.retain(|s| s.date.as_deref() == Some(date));
            (!rec.subjects.is_empty()).then_some(rec)
        })
        .collect();

    if matched.is_empty() {
        return Err(AttendError::NoRecordsForDate(date.to_string()));
    }
    Ok(matched)
}
