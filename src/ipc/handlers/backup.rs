use std::path::PathBuf;

use serde_json::json;
use tracing::{info, warn};

use crate::backup;
use crate::error::AttendError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };

    let records = match state.store.list() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_failed", e.to_string(), None),
    };

    let out = PathBuf::from(&out_path);
    let export = match backup::export_records_bundle(&records, &out) {
        Ok(v) => v,
        Err(e) => {
            warn!("bundle export to {out_path} failed: {e:#}");
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            );
        }
    };
    info!(records = export.record_count, "exported bundle to {out_path}");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "bundleId": export.bundle_id,
            "recordCount": export.record_count,
            "sha256": export.sha256
        }),
    )
}

fn handle_backup_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    // Fully verified before the store is touched.
    let bundle = match backup::import_records_bundle(&src) {
        Ok(v) => v,
        Err(e) => {
            warn!("bundle import from {in_path} rejected: {e:#}");
            return err(
                &req.id,
                "bad_bundle",
                format!("{e:#}"),
                Some(json!({ "path": in_path })),
            );
        }
    };

    let record_count = bundle.records.len();
    if let Err(e) = state.store.replace_all(bundle.records) {
        let e = AttendError::from(e);
        return err(&req.id, e.code(), e.to_string(), None);
    }
    info!(records = record_count, "imported bundle {}", bundle.bundle_id);

    ok(
        &req.id,
        json!({
            "path": in_path,
            "bundleFormat": bundle.bundle_format,
            "bundleId": bundle.bundle_id,
            "recordCount": record_count
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_backup_export_bundle(state, req)),
        "backup.importBundle" => Some(handle_backup_import_bundle(state, req)),
        _ => None,
    }
}
