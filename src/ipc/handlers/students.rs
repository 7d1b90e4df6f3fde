use serde_json::json;

use crate::ipc::error::respond;
use crate::ipc::helpers::{get_required_id, get_required_str, parse_date, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::SubjectEntry;
use crate::query;

fn students_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let students = query::list_students(&*state.store)?;
    Ok(json!({ "students": students }))
}

fn students_get(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(params, "id")?;
    let record = query::fetch_by_id(&*state.store, id)?;
    Ok(json!(record))
}

fn parse_initial_subjects(params: &serde_json::Value) -> Result<Vec<SubjectEntry>, HandlerErr> {
    let Some(raw) = params.get("subjects") else {
        return Ok(Vec::new());
    };
    let mut entries: Vec<SubjectEntry> = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid subjects: {}", e)))?;
    for e in entries.iter_mut() {
        e.sname = e.sname.trim().to_string();
        if e.sname.is_empty() {
            return Err(HandlerErr::bad_params("subject sname must not be empty"));
        }
        if let Some(d) = e.date.as_deref() {
            e.date = Some(parse_date(d)?);
        }
    }
    Ok(entries)
}

fn students_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let student_id = get_required_id(params, "studentId")?;
    let subjects = parse_initial_subjects(params)?;
    let record = query::create_student(&mut *state.store, &name, student_id, subjects)?;
    Ok(json!(record))
}

fn students_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(params, "id")?;
    let removed = query::delete_by_id(&mut *state.store, id)?;
    Ok(json!({ "student": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state),
        "students.get" => students_get(state, &req.params),
        "students.create" => students_create(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
