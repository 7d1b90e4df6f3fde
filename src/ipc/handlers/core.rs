use std::path::PathBuf;

use serde_json::json;
use tracing::{info, warn};

use crate::error::AttendError;
use crate::ipc::error::{err, ok, respond};
use crate::ipc::helpers::HandlerErr;
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteStore;

fn health(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let student_count = state.store.count().map_err(AttendError::from)?;
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "storeKind": state.store.kind(),
        "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
        "studentCount": student_count
    }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match SqliteStore::open(&path) {
        Ok(store) => {
            info!("workspace selected: {}", path.to_string_lossy());
            state.store = Box::new(store);
            state.workspace = Some(path.clone());
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "storeKind": state.store.kind()
                }),
            )
        }
        Err(e) => {
            warn!("failed to open workspace {}: {e:?}", path.to_string_lossy());
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(respond(&req.id, health(state))),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
