//! Line-delimited JSON protocol.
//!
//! Requests are `{"id", "method", "params"}`, one per line. Every request gets
//! exactly one response line, `{"id", "ok": true, "result"}` or
//! `{"id", "ok": false, "error": {"code", "message", "details"?}}`.

mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use router::handle_request;
pub use types::{AppState, Request};
