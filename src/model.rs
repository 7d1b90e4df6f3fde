use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[default]
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
    #[serde(rename = "no class today")]
    NoClassToday,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::NoClassToday => "no class today",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "no class today" => Ok(AttendanceStatus::NoClassToday),
            other => Err(format!(
                "status must be one of present, absent, no class today (got {:?})",
                other
            )),
        }
    }
}

/// One recorded class session for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub sname: String,
    // Older clients send the status under `present`.
    #[serde(default, alias = "present")]
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SubjectEntry {
    pub fn new(sname: impl Into<String>, status: AttendanceStatus) -> Self {
        Self {
            sname: sname.into(),
            status,
            date: None,
        }
    }

    pub fn on(sname: impl Into<String>, status: AttendanceStatus, date: impl Into<String>) -> Self {
        Self {
            sname: sname.into(),
            status,
            date: Some(date.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: u64,
    pub name: String,
    pub student_id: u64,
    #[serde(default)]
    pub subjects: Vec<SubjectEntry>,
}

/// Records loaded into a fresh memory store.
pub fn seed_records() -> Vec<StudentRecord> {
    vec![
        StudentRecord {
            id: 1,
            name: "John Doe".to_string(),
            student_id: 123,
            subjects: vec![
                SubjectEntry::on("Math", AttendanceStatus::Present, "2025-03-05"),
                SubjectEntry::on("Science", AttendanceStatus::Absent, "2025-03-05"),
            ],
        },
        StudentRecord {
            id: 2,
            name: "Jane Smith".to_string(),
            student_id: 124,
            subjects: vec![SubjectEntry::on(
                "Math",
                AttendanceStatus::Present,
                "2025-03-05",
            )],
        },
    ]
}
