use serde_json::json;

use crate::ipc::error::respond;
use crate::ipc::helpers::{get_required_id, get_subject_names, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::subjects;

fn subjects_add(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(params, "id")?;
    let names = get_subject_names(params, "subjects")?;
    let student = subjects::add_subjects(&mut *state.store, id, &names)?;
    Ok(json!({
        "message": "Subjects added successfully",
        "student": student
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.add" => Some(respond(&req.id, subjects_add(state, &req.params))),
        _ => None,
    }
}
