//! Axum route handlers for the Analysis API.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::analysis::extraction::run_resume_extraction;
use crate::analysis::models::{AnalysisResponse, AtsFeedback};
use crate::analysis::parser::parse_feedback;
use crate::analysis::prompts::ats_analysis_prompt;
use crate::errors::AppError;
use crate::geo;
use crate::jobs::search::{run_job_search, ScrapeSettings};
use crate::state::AppState;

/// Prefix marking synthetic accounts that never schedule background work.
const TEST_ACCOUNT_PREFIX: &str = "testaccount-";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AtsResponseGet {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub response_data: Value,
}

#[derive(Debug, Serialize)]
pub struct JobDataGet {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub response_data: Vec<Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze-resume
///
/// Synchronous path: validate the upload, score it against the requested
/// roles, persist the analysis, and return it with the correlation id the
/// client uses to track the background job search.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let submission = read_submission(&mut multipart).await?;

    let user_id = submission
        .user_id
        .unwrap_or_else(|| next_guest_id(&state.guest_seq));
    let client_id = Uuid::new_v4().to_string();

    // Scoped upload file: the guard removes it on every exit path.
    let upload = tempfile::NamedTempFile::new()
        .map_err(|e| AppError::Internal(anyhow!("failed to create upload file: {e}")))?;
    tokio::fs::write(upload.path(), &submission.pdf)
        .await
        .map_err(|e| AppError::Internal(anyhow!("failed to persist upload: {e}")))?;
    let pdf = tokio::fs::read(upload.path())
        .await
        .map_err(|e| AppError::Internal(anyhow!("failed to read upload: {e}")))?;

    let prompt = ats_analysis_prompt(&submission.roles);
    let reply = state
        .llm
        .call_text(&prompt, Some(&pdf))
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let ats_feedback = parse_feedback(&reply)
        .map_err(|e| AppError::UnprocessableEntity(format!("Failed to parse AI response: {e}")))?;

    let response = AnalysisResponse {
        random_id: client_id.clone(),
        datetime: Utc::now().to_rfc3339(),
        ats_feedback,
    };
    let blob = serde_json::to_string(&response).map_err(|e| AppError::Internal(e.into()))?;
    state.ats_store.upsert(&user_id, &blob).await?;

    if !user_id.starts_with(TEST_ACCOUNT_PREFIX) {
        schedule_background_tasks(
            &state,
            &headers,
            &response.ats_feedback,
            client_id,
            user_id,
            submission.pdf,
        );
    }

    Ok(Json(response))
}

/// GET /ats-response/:user_id
pub async fn handle_get_ats_response(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AtsResponseGet>, AppError> {
    let blob = state.ats_store.get(&user_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("No ATS response found for user ID: {user_id}"))
    })?;
    let response_data: Value = serde_json::from_str(&blob)
        .map_err(|e| AppError::Internal(anyhow!("stored analysis is not valid JSON: {e}")))?;
    Ok(Json(AtsResponseGet {
        user_id,
        response_data,
    }))
}

/// GET /job-data/:user_id
pub async fn handle_get_job_data(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<JobDataGet>, AppError> {
    let blob = state
        .jobs_store
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No job data found for user ID: {user_id}")))?;
    let response_data: Vec<Value> = serde_json::from_str(&blob)
        .map_err(|e| AppError::Internal(anyhow!("stored job data is not valid JSON: {e}")))?;
    Ok(Json(JobDataGet {
        user_id,
        response_data,
    }))
}

/// GET /sharable-resume/:resume_id
pub async fn handle_get_sharable_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let blob = state.resume_store.get(&resume_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("No shareable resume found for ID: {resume_id}"))
    })?;
    let record: Value = serde_json::from_str(&blob)
        .map_err(|e| AppError::Internal(anyhow!("stored resume is not valid JSON: {e}")))?;
    Ok(Json(record))
}

// ────────────────────────────────────────────────────────────────────────────
// Submission parsing and background scheduling
// ────────────────────────────────────────────────────────────────────────────

struct Submission {
    roles: Vec<String>,
    pdf: Bytes,
    user_id: Option<String>,
}

async fn read_submission(multipart: &mut Multipart) -> Result<Submission, AppError> {
    let mut roles = None;
    let mut pdf = None;
    let mut user_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("roles") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable 'roles' field: {e}")))?;
                roles = Some(parse_roles(&raw)?);
            }
            Some("resume") => {
                if field.content_type() != Some("application/pdf") {
                    return Err(AppError::Validation("Resume must be a PDF file.".to_string()));
                }
                pdf = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("unreadable 'resume' field: {e}"))
                })?);
            }
            Some("user_id") => {
                let raw = field.text().await.map_err(|e| {
                    AppError::Validation(format!("unreadable 'user_id' field: {e}"))
                })?;
                if !raw.trim().is_empty() {
                    user_id = Some(raw.trim().to_string());
                }
            }
            _ => {}
        }
    }

    Ok(Submission {
        roles: roles
            .ok_or_else(|| AppError::Validation("'roles' field is required".to_string()))?,
        pdf: pdf.ok_or_else(|| AppError::Validation("'resume' field is required".to_string()))?,
        user_id,
    })
}

/// Accepts a JSON array (how the frontend submits) or a comma-separated list.
fn parse_roles(raw: &str) -> Result<Vec<String>, AppError> {
    let roles: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("'roles' is not a valid JSON array: {e}")))?
    } else {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    if roles.is_empty() {
        return Err(AppError::Validation(
            "at least one target role is required".to_string(),
        ));
    }
    Ok(roles)
}

fn next_guest_id(seq: &AtomicU64) -> String {
    let n = seq.fetch_add(1, Ordering::Relaxed);
    format!("{TEST_ACCOUNT_PREFIX}{n:02}")
}

/// Spawns the job search and the shareable-resume extraction, both decoupled
/// from the request/response cycle.
fn schedule_background_tasks(
    state: &AppState,
    headers: &HeaderMap,
    feedback: &AtsFeedback,
    client_id: String,
    user_id: String,
    pdf: Bytes,
) {
    let roles: Vec<String> = feedback.roles.keys().cloned().collect();
    state.job_status.register(&client_id, "Job search started");
    info!(%client_id, %user_id, roles = roles.len(), "scheduling background tasks");

    let ip = geo::forwarded_ip(headers);
    let http = state.http.clone();
    let scraper = state.scraper.clone();
    let jobs_store = state.jobs_store.clone();
    let tracker = state.job_status.clone();
    let settings = ScrapeSettings::from_config(&state.config);
    let default_location = state.config.default_location.clone();
    let search_client_id = client_id.clone();
    let search_user_id = user_id.clone();
    tokio::spawn(async move {
        // Geolocation resolves inside the task so the response never waits on it.
        let location = geo::resolve_region(&http, ip, &default_location).await;
        run_job_search(
            scraper,
            jobs_store,
            tracker,
            settings,
            roles,
            search_client_id,
            search_user_id,
            location,
        )
        .await;
    });

    tokio::spawn(run_resume_extraction(
        state.llm.clone(),
        state.resume_store.clone(),
        pdf,
        client_id,
        user_id,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles_json_array() {
        let roles = parse_roles(r#"["Backend Engineer", "Data Analyst"]"#).unwrap();
        assert_eq!(roles, ["Backend Engineer", "Data Analyst"]);
    }

    #[test]
    fn test_parse_roles_comma_separated() {
        let roles = parse_roles("Backend Engineer, Data Analyst").unwrap();
        assert_eq!(roles, ["Backend Engineer", "Data Analyst"]);
    }

    #[test]
    fn test_parse_roles_rejects_empty() {
        assert!(parse_roles("[]").is_err());
        assert!(parse_roles("  ").is_err());
    }

    #[test]
    fn test_parse_roles_rejects_malformed_json() {
        assert!(parse_roles(r#"["unterminated"#).is_err());
    }

    #[test]
    fn test_guest_ids_are_sequential_test_accounts() {
        let seq = AtomicU64::new(1);
        assert_eq!(next_guest_id(&seq), "testaccount-01");
        assert_eq!(next_guest_id(&seq), "testaccount-02");
    }
}
