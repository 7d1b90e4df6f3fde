use serde_json::json;

use crate::ipc::error::respond;
use crate::ipc::helpers::{
    get_optional_status, get_required_date, get_required_id, get_required_str, today, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::query;
use crate::subjects;

fn attendance_record(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(params, "id")?;
    let subject = get_required_str(params, "subject")?;
    let status = get_optional_status(params, "status")?;
    let recorded =
        subjects::record_status(&mut *state.store, id, &subject, status, &today())?;
    Ok(json!({
        "message": "Attendance recorded successfully",
        "student": recorded.student,
        "subject": recorded.subject,
        "status": recorded.status,
        "date": recorded.date
    }))
}

fn attendance_summary(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(params, "id")?;
    let summary = query::summarize_by_id(&*state.store, id)?;
    Ok(json!(summary))
}

fn attendance_by_date(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let students = query::list_by_date(&*state.store, &date)?;
    Ok(json!({ "date": date, "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.record" => attendance_record(state, &req.params),
        "attendance.summary" => attendance_summary(state, &req.params),
        "attendance.byDate" => attendance_by_date(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
