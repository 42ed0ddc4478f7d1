//! Sync routes
//!
//! `POST /sync/start` validates the request, generates a job id, and
//! spawns the load on a background task so the caller can poll
//! `GET /sync/status/:job_id` (or `GET /sync/status` for all jobs).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mirror_core::{
    ConnectionConfig, FullLoadOptions, IncrementalLoadOptions, SimulatedSource, SimulatedTarget,
};

use crate::state::AppState;

/// Create sync routes
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/sync/start", post(start_sync))
        .route("/sync/status", get(list_statuses))
        .route("/sync/status/:job_id", get(get_status))
}

/// Kind of load to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Full,
    Incremental,
}

/// Per-request load options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSyncOptions {
    // Full load
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub use_compression: bool,
    // Incremental load
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub incremental_key_column: Option<String>,
    #[serde(default)]
    pub target_table_name: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub max_batches: Option<usize>,
}

/// Request body for `POST /sync/start`
#[derive(Debug, Deserialize)]
pub struct StartSyncRequest {
    pub sync_type: SyncType,
    pub source_config: ConnectionConfig,
    pub target_config: ConnectionConfig,
    /// Source table (full load; incremental reads it from `options`)
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub options: StartSyncOptions,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Start a full or incremental load
///
/// POST /sync/start
async fn start_sync(
    State(state): State<AppState>,
    Json(request): Json<StartSyncRequest>,
) -> Result<Response, StatusCode> {
    let StartSyncRequest {
        sync_type,
        source_config,
        target_config,
        table_name,
        options: request_options,
    } = request;

    let job_id = format!("job-{}", Uuid::new_v4());
    tracing::info!(
        %job_id,
        sync_type = ?sync_type,
        source = source_config.display_name(),
        target = target_config.display_name(),
        "Sync request received"
    );

    match sync_type {
        SyncType::Full => {
            let Some(table_name) = table_name.filter(|t| !t.is_empty()) else {
                return Ok(bad_request("Missing table_name for full sync type"));
            };

            let options = FullLoadOptions {
                chunk_size: request_options.chunk_size,
                use_compression: request_options.use_compression,
            };

            let engine = state.engine.clone();
            let spawned_job_id = job_id.clone();
            let message = format!(
                "Full synchronization process started for table {}",
                table_name
            );
            tokio::spawn(async move {
                let source = SimulatedSource::new(&source_config);
                let target = SimulatedTarget::new(&target_config);
                let cancel = CancellationToken::new();

                match engine
                    .full_load(
                        &spawned_job_id,
                        &source,
                        &target,
                        &table_name,
                        &options,
                        &cancel,
                    )
                    .await
                {
                    Ok(summary) => tracing::info!(
                        job_id = %spawned_job_id,
                        table = %summary.table,
                        processed = summary.processed_records,
                        "Background full load completed"
                    ),
                    Err(e) => tracing::error!(
                        job_id = %spawned_job_id,
                        error = %e,
                        "Background full load failed"
                    ),
                }
            });

            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "message": message, "job_id": job_id })),
            )
                .into_response())
        },
        SyncType::Incremental => {
            let (Some(table_name), Some(key_column)) = (
                request_options.table_name.clone().filter(|t| !t.is_empty()),
                request_options
                    .incremental_key_column
                    .clone()
                    .filter(|c| !c.is_empty()),
            ) else {
                return Ok(bad_request(
                    "Missing options (table_name, incremental_key_column) for incremental sync type",
                ));
            };

            let options = IncrementalLoadOptions {
                table_name: table_name.clone(),
                incremental_key_column: key_column,
                target_table_name: request_options.target_table_name.clone(),
                batch_size: request_options.batch_size,
                max_batches: request_options.max_batches,
            };

            let engine = state.engine.clone();
            let spawned_job_id = job_id.clone();
            let message = format!(
                "Incremental synchronization process started for table {}",
                table_name
            );
            tokio::spawn(async move {
                let source = SimulatedSource::new(&source_config);
                let target = SimulatedTarget::new(&target_config);
                let cancel = CancellationToken::new();

                match engine
                    .incremental_load(&spawned_job_id, &source, &target, &options, &cancel)
                    .await
                {
                    Ok(summary) => tracing::info!(
                        job_id = %spawned_job_id,
                        table = %summary.source_table,
                        processed = summary.processed_records,
                        outcome = ?summary.outcome,
                        "Background incremental load completed"
                    ),
                    Err(e) => tracing::error!(
                        job_id = %spawned_job_id,
                        error = %e,
                        "Background incremental load failed"
                    ),
                }
            });

            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "message": message, "job_id": job_id })),
            )
                .into_response())
        },
    }
}

/// Get the status of a single job
///
/// GET /sync/status/:job_id
async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, StatusCode> {
    match state.engine.job_status(&job_id) {
        Some(job) => Ok((StatusCode::OK, Json(json!(job))).into_response()),
        None => {
            tracing::debug!(%job_id, "Job not found");
            Err(StatusCode::NOT_FOUND)
        },
    }
}

/// List all job statuses, most recently updated first
///
/// GET /sync/status
async fn list_statuses(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let statuses = state.engine.list_jobs();
    Ok((StatusCode::OK, Json(json!(statuses))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mirror_core::{
        JobState, JobStatusStore, JobStore, MemoryCheckpointStore, SyncConfig, SyncEngine,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let engine = SyncEngine::new(
            Arc::new(JobStore::new()),
            Arc::new(MemoryCheckpointStore::new()),
            SyncConfig::default(),
        );
        AppState::new(Arc::new(engine))
    }

    fn app(state: AppState) -> Router {
        Router::new().nest("/api", sync_routes()).with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn start_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sync/start")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_start_requires_table_name() {
        let response = app(test_state())
            .oneshot(start_request(json!({
                "sync_type": "full",
                "source_config": { "type": "relational", "host": "src" },
                "target_config": { "type": "relational", "host": "tgt" }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response.into_response()).await;
        assert!(body["error"].as_str().unwrap().contains("table_name"));
    }

    #[tokio::test]
    async fn test_incremental_start_requires_key_column() {
        let response = app(test_state())
            .oneshot(start_request(json!({
                "sync_type": "incremental",
                "source_config": { "type": "relational", "host": "src" },
                "target_config": { "type": "relational", "host": "tgt" },
                "options": { "table_name": "events" }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_full_start_runs_to_completion() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(start_request(json!({
                "sync_type": "full",
                "source_config": { "type": "file", "path": "/data/in.csv", "format": "csv" },
                "target_config": { "type": "file", "path": "/data/out.csv", "format": "csv" },
                "table_name": "staging"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response.into_response()).await;
        let job_id = body["job_id"].as_str().unwrap().to_string();
        assert!(job_id.starts_with("job-"));

        // The file profile is 10k rows in one default chunk; wait for the
        // background task to finish.
        let mut job = None;
        for _ in 0..200 {
            if let Some(record) = state.engine.job_status(&job_id) {
                if record.status.is_terminal() {
                    job = Some(record);
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let job = job.expect("background full load did not finish");
        assert_eq!(job.status, JobState::Completed);
        assert_eq!(job.progress, Some(100));
    }

    #[tokio::test]
    async fn test_status_endpoints() {
        let state = test_state();
        state.engine.job_store().init_job("job-known");

        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/sync/status/job-known")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_response()).await;
        assert_eq!(body["job_id"], "job-known");
        assert_eq!(body["status"], "pending");

        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/sync/status/job-unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/sync/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_response()).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
