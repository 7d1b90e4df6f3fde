use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "attendd.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE_NAME)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(db_path(workspace))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // `seq` keeps insertion order; `id` is the caller-facing identifier.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            student_no INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subject_entries(
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            record_id INTEGER NOT NULL,
            sname TEXT NOT NULL,
            status TEXT NOT NULL,
            date TEXT,
            FOREIGN KEY(record_id) REFERENCES students(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subject_entries_record ON subject_entries(record_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subject_entries_date ON subject_entries(date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS store_meta(
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO store_meta(key, value) VALUES('next_id', 1)",
        [],
    )?;

    Ok(conn)
}
