//! Per-client notification channel for background job searches.
//!
//! One subscription per correlation id. The channel polls the status
//! tracker, delivers exactly one terminal message, and closes on every exit
//! path, normal or exceptional.

use std::path::Path as FsPath;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;
use tracing::{debug, warn};

use crate::jobs::listings::JobListing;
use crate::jobs::search::artifact_path;
use crate::jobs::status::JobState;
use crate::state::AppState;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Terminal message delivered over the channel.
#[derive(Debug, Serialize)]
struct JobSearchUpdate {
    status: &'static str,
    message: String,
    jobs: Vec<JobListing>,
}

/// GET /ws/:client_id
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| notify_on_completion(socket, client_id, state))
}

async fn notify_on_completion(mut socket: WebSocket, client_id: String, state: AppState) {
    if let Err(e) = poll_and_deliver(&mut socket, &client_id, &state).await {
        warn!(%client_id, "notification channel error: {e:#}");
        let update = JobSearchUpdate {
            status: "error",
            message: e.to_string(),
            jobs: Vec::new(),
        };
        // Best effort: the peer may already be gone.
        let _ = send_update(&mut socket, &update).await;
    }
    let _ = socket.send(Message::Close(None)).await;
    debug!(%client_id, "notification channel closed");
}

/// Polls the tracker until the entry reaches a terminal state, then delivers
/// the single terminal message. Returns after the first delivery.
async fn poll_and_deliver(
    socket: &mut WebSocket,
    client_id: &str,
    state: &AppState,
) -> Result<()> {
    loop {
        match state.job_status.get(client_id) {
            Some(entry) if entry.state == JobState::Completed => {
                let path = artifact_path(client_id);
                let jobs = load_listings(&path).await?;
                discard_artifact(&path).await;
                send_update(
                    socket,
                    &JobSearchUpdate {
                        status: "completed",
                        message: "Job search completed!".to_string(),
                        jobs,
                    },
                )
                .await?;
                return Ok(());
            }
            Some(entry) if entry.state == JobState::Failed => {
                send_update(
                    socket,
                    &JobSearchUpdate {
                        status: "failed",
                        message: entry.message,
                        jobs: Vec::new(),
                    },
                )
                .await?;
                return Ok(());
            }
            // Unknown id or still pending: keep waiting. The loop is bounded
            // by the scrape it waits on, not an internal timeout.
            _ => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }
}

async fn send_update(socket: &mut WebSocket, update: &JobSearchUpdate) -> Result<()> {
    let payload = serde_json::to_string(update).context("failed to serialize update")?;
    socket
        .send(Message::Text(payload))
        .await
        .context("failed to deliver update")?;
    Ok(())
}

async fn load_listings(path: &FsPath) -> Result<Vec<JobListing>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .context("failed to read listings artifact")?;
    serde_json::from_str(&raw).context("listings artifact is not valid JSON")
}

/// Best-effort removal of the consumed artifact. Failure is logged, never fatal.
async fn discard_artifact(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), "failed to delete listings artifact: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_listings_round_trips_artifact() {
        let path = std::env::temp_dir().join("job_results_ws_load_test.json");
        let listings = vec![JobListing {
            job_url: "https://jobs.example/1".to_string(),
            title: "Backend Engineer".to_string(),
            company: None,
            location: None,
            date_posted: None,
            is_remote: None,
            company_url: None,
            company_logo: None,
        }];
        tokio::fs::write(&path, serde_json::to_string(&listings).unwrap())
            .await
            .unwrap();

        let loaded = load_listings(&path).await.unwrap();
        assert_eq!(loaded, listings);

        discard_artifact(&path).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_load_listings_missing_artifact_is_error() {
        let path = std::env::temp_dir().join("job_results_ws_missing_test.json");
        assert!(load_listings(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_discard_artifact_tolerates_missing_file() {
        let path = std::env::temp_dir().join("job_results_ws_gone_test.json");
        // must not panic
        discard_artifact(&path).await;
    }
}
