use super::{RecordStore, StoreError};
use crate::db;
use crate::model::{AttendanceStatus, StudentRecord, SubjectEntry};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)?;
        debug!("opened sqlite store in {}", workspace.to_string_lossy());
        Ok(Self { conn })
    }

    fn entries_for(&self, id: u64) -> Result<Vec<SubjectEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT sname, status, date
             FROM subject_entries
             WHERE record_id = ?
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([id as i64], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<String>>(2)?,
                ))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
        rows.into_iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(
    (sname, status, date): (String, String, Option<String>),
) -> Result<SubjectEntry, StoreError> {
    let status = status
        .parse::<AttendanceStatus>()
        .map_err(StoreError::Corrupt)?;
    Ok(SubjectEntry {
        sname,
        status,
        date,
    })
}

fn insert_entries(
    tx: &Transaction<'_>,
    id: u64,
    entries: &[SubjectEntry],
) -> Result<(), StoreError> {
    let mut stmt = tx.prepare(
        "INSERT INTO subject_entries(record_id, sname, status, date) VALUES(?, ?, ?, ?)",
    )?;
    for e in entries {
        stmt.execute((id as i64, &e.sname, e.status.as_str(), e.date.as_deref()))?;
    }
    Ok(())
}

fn sql_id(id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::IdOutOfRange(id))
}

fn insert_record(tx: &Transaction<'_>, record: &StudentRecord) -> Result<(), StoreError> {
    let id = sql_id(record.id)?;
    let student_no = sql_id(record.student_id)?;
    if student_exists(tx, record.id)? {
        return Err(StoreError::DuplicateId(record.id));
    }
    tx.execute(
        "INSERT INTO students(id, name, student_no) VALUES(?, ?, ?)",
        (id, &record.name, student_no),
    )?;
    insert_entries(tx, record.id, &record.subjects)?;
    tx.execute(
        "UPDATE store_meta SET value = MAX(value, ?) WHERE key = 'next_id'",
        [id.saturating_add(1)],
    )?;
    Ok(())
}

fn student_exists(conn: &Connection, id: u64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row("SELECT 1 FROM students WHERE id = ?", [id as i64], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

impl RecordStore for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn list(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let mut by_record: HashMap<u64, Vec<SubjectEntry>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT record_id, sname, status, date
             FROM subject_entries
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)? as u64,
                    (
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, Option<String>>(3)?,
                    ),
                ))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
        for (record_id, row) in rows {
            by_record
                .entry(record_id)
                .or_default()
                .push(entry_from_row(row)?);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, student_no FROM students ORDER BY seq")?;
        let students = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)? as u64,
                    r.get::<_, String>(1)?,
                    r.get::<_, i64>(2)? as u64,
                ))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;

        Ok(students
            .into_iter()
            .map(|(id, name, student_id)| StudentRecord {
                id,
                name,
                student_id,
                subjects: by_record.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    fn find(&self, id: u64) -> Result<Option<StudentRecord>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, student_no FROM students WHERE id = ?",
                [id as i64],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)? as u64)),
            )
            .optional()?;
        let Some((name, student_id)) = row else {
            return Ok(None);
        };
        Ok(Some(StudentRecord {
            id,
            name,
            student_id,
            subjects: self.entries_for(id)?,
        }))
    }

    fn allocate_id(&mut self) -> Result<u64, StoreError> {
        let tx = self.conn.transaction()?;
        let next: i64 = tx.query_row(
            "SELECT value FROM store_meta WHERE key = 'next_id'",
            [],
            |r| r.get(0),
        )?;
        let bumped = next
            .checked_add(1)
            .ok_or(StoreError::IdOutOfRange(next as u64))?;
        tx.execute(
            "UPDATE store_meta SET value = ? WHERE key = 'next_id'",
            [bumped],
        )?;
        tx.commit()?;
        Ok(next as u64)
    }

    fn insert(&mut self, record: StudentRecord) -> Result<StudentRecord, StoreError> {
        let tx = self.conn.transaction()?;
        insert_record(&tx, &record)?;
        tx.commit()?;
        Ok(record)
    }

    fn replace_all(&mut self, records: Vec<StudentRecord>) -> Result<(), StoreError> {
        // Dropping the transaction on error rolls the delete back too.
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM subject_entries", [])?;
        tx.execute("DELETE FROM students", [])?;
        for record in &records {
            insert_record(&tx, record)?;
        }
        tx.commit()?;
        debug!(records = records.len(), "replaced sqlite store contents");
        Ok(())
    }

    fn append_entries(
        &mut self,
        id: u64,
        entries: &[SubjectEntry],
    ) -> Result<Option<StudentRecord>, StoreError> {
        if !student_exists(&self.conn, id)? {
            return Ok(None);
        }
        let tx = self.conn.transaction()?;
        insert_entries(&tx, id, entries)?;
        tx.commit()?;
        self.find(id)
    }

    fn remove_by_id(&mut self, id: u64) -> Result<Option<StudentRecord>, StoreError> {
        let Some(record) = self.find(id)? else {
            return Ok(None);
        };
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM subject_entries WHERE record_id = ?",
            [id as i64],
        )?;
        tx.execute("DELETE FROM students WHERE id = ?", [id as i64])?;
        tx.commit()?;
        Ok(Some(record))
    }

    fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}
