//! DataMirror Server Library
//!
//! HTTP layer over the sync engine.
//!
//! # Overview
//!
//! The server exposes a small JSON API for triggering loads and polling
//! their status:
//!
//! - `POST /api/sync/start` — start a full or incremental load
//! - `GET /api/sync/status/:job_id` — status of one job
//! - `GET /api/sync/status` — all jobs, most recent first
//!
//! Loads run as background tasks; the start endpoint responds
//! immediately with the generated job id, and callers poll the status
//! endpoints for progress. Connection configs select the simulated
//! adapters; swapping in real connectivity is an adapter concern, not a
//! route concern.

pub mod config;
pub mod features;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use state::AppState;
