use super::{RecordStore, StoreError};
use crate::model::{seed_records, StudentRecord, SubjectEntry};
use std::collections::HashSet;
use tracing::debug;

pub struct MemoryStore {
    records: Vec<StudentRecord>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let mut store = Self::new();
        for record in seed_records() {
            // Seed ids are distinct, so this cannot collide.
            if let Err(e) = store.insert(record) {
                debug!("skipping seed record: {e}");
            }
        }
        store
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

impl RecordStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn list(&self) -> Result<Vec<StudentRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn find(&self, id: u64) -> Result<Option<StudentRecord>, StoreError> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn allocate_id(&mut self) -> Result<u64, StoreError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(StoreError::IdOutOfRange(id))?;
        Ok(id)
    }

    fn insert(&mut self, record: StudentRecord) -> Result<StudentRecord, StoreError> {
        if self.position(record.id).is_some() {
            return Err(StoreError::DuplicateId(record.id));
        }
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        self.records.push(record.clone());
        Ok(record)
    }

    fn replace_all(&mut self, records: Vec<StudentRecord>) -> Result<(), StoreError> {
        let mut ids = HashSet::new();
        if let Some(dup) = records.iter().find(|r| !ids.insert(r.id)) {
            return Err(StoreError::DuplicateId(dup.id));
        }
        let top = records.iter().map(|r| r.id.saturating_add(1)).max();
        self.next_id = self.next_id.max(top.unwrap_or(0));
        self.records = records;
        Ok(())
    }

    fn append_entries(
        &mut self,
        id: u64,
        entries: &[SubjectEntry],
    ) -> Result<Option<StudentRecord>, StoreError> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.subjects.extend_from_slice(entries);
        Ok(Some(record.clone()))
    }

    fn remove_by_id(&mut self, id: u64) -> Result<Option<StudentRecord>, StoreError> {
        Ok(self.position(id).map(|idx| self.records.remove(idx)))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}
