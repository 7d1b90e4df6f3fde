use chrono::NaiveDate;
use serde_json::json;

use crate::error::AttendError;
use crate::ipc::error::err;
use crate::model::AttendanceStatus;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<AttendError> for HandlerErr {
    fn from(e: AttendError) -> Self {
        let details = match &e {
            AttendError::NotFound(id) => Some(json!({ "id": id })),
            AttendError::NoRecordsForDate(date) => Some(json!({ "date": date })),
            AttendError::Store(_) => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

/// Positive integer identifier.
pub fn get_required_id(params: &serde_json::Value, key: &str) -> Result<u64, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    match v.as_u64() {
        Some(n) if n > 0 => Ok(n),
        _ => Err(HandlerErr::bad_params(format!(
            "{} must be a positive integer",
            key
        ))),
    }
}

/// Non-empty string, trimmed.
pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let s = params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    if s.is_empty() {
        return Err(HandlerErr::bad_params(format!("{} must not be empty", key)));
    }
    Ok(s)
}

pub fn get_optional_status(
    params: &serde_json::Value,
    key: &str,
) -> Result<AttendanceStatus, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(AttendanceStatus::default()),
        Some(v) => v
            .as_str()
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key)))?
            .parse::<AttendanceStatus>()
            .map_err(HandlerErr::bad_params),
    }
}

pub fn parse_date(raw: &str) -> Result<String, HandlerErr> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|_| trimmed.to_string())
        .map_err(|_| HandlerErr::bad_params(format!("date must be YYYY-MM-DD (got {:?})", raw)))
}

pub fn get_required_date(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    parse_date(&get_required_str(params, key)?)
}

/// Subject list as either `["Math"]` or `[{ "sname": "Math" }]`.
pub fn get_subject_names(params: &serde_json::Value, key: &str) -> Result<Vec<String>, HandlerErr> {
    let Some(items) = params.get(key).and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    items
        .iter()
        .map(|v| {
            let name = v
                .as_str()
                .or_else(|| v.get("sname").and_then(|s| s.as_str()))
                .map(str::trim);
            match name {
                Some(n) if !n.is_empty() => Ok(n.to_string()),
                _ => Err(HandlerErr::bad_params(format!(
                    "each entry of {} must be a non-empty name or {{\"sname\": ...}}",
                    key
                ))),
            }
        })
        .collect()
}

pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
