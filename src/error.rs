use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendError {
    #[error("student {0} not found")]
    NotFound(u64),

    #[error("no attendance records for {0}")]
    NoRecordsForDate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AttendError {
    /// Error code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            AttendError::NotFound(_) => "not_found",
            AttendError::NoRecordsForDate(_) => "no_records_for_date",
            AttendError::Store(StoreError::DuplicateId(_)) => "duplicate_id",
            AttendError::Store(_) => "store_failed",
        }
    }
}
