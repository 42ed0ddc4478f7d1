//! Status commands
//!
//! Query a running mirror-server for job status. Job records are
//! in-process server state, so these commands go over HTTP rather than
//! reading anything locally.

use anyhow::{bail, Result};

/// Default server URL when not specified via environment variable
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

fn server_url() -> String {
    std::env::var("MIRROR_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

/// Fetch and print the status of one job
pub async fn status(job_id: String) -> Result<()> {
    let url = format!("{}/api/sync/status/{}", server_url(), job_id);
    let response = reqwest::get(&url).await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        bail!("Job not found: {}", job_id);
    }

    let body: serde_json::Value = response.error_for_status()?.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Fetch and print all job statuses, most recent first
pub async fn jobs() -> Result<()> {
    let url = format!("{}/api/sync/status", server_url());
    let body: serde_json::Value = reqwest::get(&url)
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
