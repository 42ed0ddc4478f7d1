//! Sync feature module
//!
//! Endpoints for triggering full/incremental loads and polling job
//! status. Starting a load is fire-and-forget: the handler responds with
//! the job id and the load continues as a background task.

pub mod routes;

pub use routes::sync_routes;
