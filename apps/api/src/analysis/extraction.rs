//! Background shareable-resume extraction.
//!
//! Runs decoupled from the submission request: extracts plain text from the
//! uploaded PDF, asks the model for a structured profile, and stores the
//! result keyed by the submission's correlation id. Failures are logged;
//! nothing in the synchronous path depends on this task.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::analysis::parser::strip_code_fences;
use crate::analysis::prompts::SHARABLE_RESUME_PROMPT_TEMPLATE;
use crate::llm_client::LlmClient;
use crate::store::BlobStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInformation {
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub responsibilities: Vec<String>,
    pub technologies_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub role: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Award {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdditionalSections {
    #[serde(default)]
    pub awards: Vec<Award>,
}

/// Structured profile extracted from the résumé, per the frontend contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharableResume {
    pub name: String,
    pub email: String,
    pub contact_information: ContactInformation,
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub additional_sections: AdditionalSections,
}

/// Fire-and-forget entry point spawned by the request coordinator.
pub async fn run_resume_extraction(
    llm: LlmClient,
    store: Arc<dyn BlobStore>,
    pdf: Bytes,
    resume_id: String,
    user_id: String,
) {
    match extract(&llm, store.as_ref(), pdf, &resume_id, &user_id).await {
        Ok(()) => info!(%resume_id, %user_id, "shareable resume stored"),
        Err(e) => error!(%resume_id, %user_id, "resume extraction failed: {e:#}"),
    }
}

async fn extract(
    llm: &LlmClient,
    store: &dyn BlobStore,
    pdf: Bytes,
    resume_id: &str,
    user_id: &str,
) -> Result<()> {
    // pdf-extract is synchronous and CPU-bound; keep it off the event loop.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .context("pdf text extraction task failed")?
        .map_err(|e| anyhow::anyhow!("failed to extract text from PDF: {e}"))?;

    let prompt = SHARABLE_RESUME_PROMPT_TEMPLATE.replace("{resume_text}", &text);
    let reply = llm
        .call_text(&prompt, None)
        .await
        .context("resume extraction call failed")?;

    let profile: SharableResume = serde_json::from_str(strip_code_fences(&reply))
        .context("model reply did not match the resume schema")?;

    let record = resume_record(resume_id, user_id, &profile)?;
    store
        .upsert(resume_id, &record.to_string())
        .await
        .context("failed to store shareable resume")?;

    Ok(())
}

/// Wraps the extracted profile in the stored envelope, stamping identity
/// and creation time.
fn resume_record(resume_id: &str, user_id: &str, profile: &SharableResume) -> Result<Value> {
    let mut body = serde_json::to_value(profile)?;
    let fields = body
        .as_object_mut()
        .expect("SharableResume serializes to an object");
    fields.insert("resume_id".to_string(), Value::from(resume_id));
    fields.insert("user_id".to_string(), Value::from(user_id));
    fields.insert(
        "created_at".to_string(),
        Value::from(Utc::now().to_rfc3339()),
    );
    Ok(json!({ "sharable_resume": body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> SharableResume {
        serde_json::from_value(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "contact_information": {
                "phone": "+44 0000",
                "linkedin": "in/ada",
                "github": "gh/ada",
                "address": "London"
            },
            "summary": "Engineer.",
            "skills": ["rust"]
        }))
        .unwrap()
    }

    #[test]
    fn test_profile_tolerates_missing_sections() {
        let profile = sample_profile();
        assert!(profile.experience.is_empty());
        assert!(profile.additional_sections.awards.is_empty());
    }

    #[test]
    fn test_resume_record_envelope_shape() {
        let record = resume_record("client-1", "user-1", &sample_profile()).unwrap();
        let inner = &record["sharable_resume"];
        assert_eq!(inner["resume_id"], "client-1");
        assert_eq!(inner["user_id"], "user-1");
        assert_eq!(inner["name"], "Ada Lovelace");
        assert!(inner["created_at"].as_str().is_some());
    }

    #[test]
    fn test_gpa_is_dropped_when_absent() {
        let entry = EducationEntry {
            institution: "Uni".to_string(),
            degree: "BSc".to_string(),
            year: "2020".to_string(),
            gpa: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(!json.as_object().unwrap().contains_key("gpa"));
    }
}
