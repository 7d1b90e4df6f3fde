use std::path::PathBuf;

use serde::Deserialize;

use crate::store::RecordStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Box<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Box<dyn RecordStore>, workspace: Option<PathBuf>) -> Self {
        Self { workspace, store }
    }
}
