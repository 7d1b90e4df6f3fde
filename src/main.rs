mod attendance;
mod backup;
mod config;
mod db;
mod error;
mod ipc;
mod model;
mod query;
mod store;
mod subjects;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{info, warn};

use config::Config;
use store::{MemoryStore, RecordStore, SqliteStore};

fn open_store(config: &Config) -> anyhow::Result<Box<dyn RecordStore>> {
    if let Some(path) = config.workspace.as_ref() {
        let store = SqliteStore::open(path)
            .with_context(|| format!("failed to open workspace {}", path.to_string_lossy()))?;
        return Ok(Box::new(store));
    }
    if config.no_seed {
        Ok(Box::new(MemoryStore::new()))
    } else {
        Ok(Box::new(MemoryStore::seeded()))
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    config::init_tracing(&config);

    let store = open_store(&config)?;
    info!(
        store = store.kind(),
        students = store.count().unwrap_or_default(),
        "attendd ready"
    );
    let mut state = ipc::AppState::new(store, config.workspace.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!("stdin read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No request id to echo back.
                warn!("bad request line: {e}");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed, shutting down");
    Ok(())
}
