//! Student record storage.
//!
//! Every operation in the service reaches records through [`RecordStore`].
//! The process owns exactly one store (see `ipc::AppState`) and hands it to
//! handlers by `&mut`, so reads and writes are serialized by construction.
//!
//! - [`MemoryStore`]: ordered `Vec`, linear lookups, gone on restart.
//! - [`SqliteStore`]: same contract inside a workspace directory.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::model::{StudentRecord, SubjectEntry};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate student id: {0}")]
    DuplicateId(u64),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("student id {0} is out of range")]
    IdOutOfRange(u64),

    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

pub trait RecordStore {
    /// Short backend name reported by `health`.
    fn kind(&self) -> &'static str;

    /// All records in insertion order.
    fn list(&self) -> Result<Vec<StudentRecord>, StoreError>;

    fn find(&self, id: u64) -> Result<Option<StudentRecord>, StoreError>;

    /// Reserve the next identifier. Identifiers are never handed out twice,
    /// even after the record holding one is deleted.
    fn allocate_id(&mut self) -> Result<u64, StoreError>;

    /// Insert a record under its own `id`. Fails with `DuplicateId` if the id
    /// is taken; otherwise the id counter is moved past it.
    fn insert(&mut self, record: StudentRecord) -> Result<StudentRecord, StoreError>;

    /// Append entries to a record's subject list, keeping their order.
    /// Returns the updated record, or `None` if `id` is unknown.
    fn append_entries(
        &mut self,
        id: u64,
        entries: &[SubjectEntry],
    ) -> Result<Option<StudentRecord>, StoreError>;

    /// Remove a record together with its entries.
    fn remove_by_id(&mut self, id: u64) -> Result<Option<StudentRecord>, StoreError>;

    /// Swap the whole contents for `records`, keeping their ids. Either every
    /// record lands or the store is left as it was. The id counter only moves
    /// forward.
    fn replace_all(&mut self, records: Vec<StudentRecord>) -> Result<(), StoreError>;

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }
}
