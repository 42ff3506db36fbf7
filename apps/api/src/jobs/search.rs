//! Scrape Orchestrator: runs one background job search per submission.
//!
//! Invoked fire-and-forget from the request coordinator. Always terminates
//! by writing a terminal status for its correlation id; errors never escape
//! the task boundary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::jobs::listings::{normalize_rows, JobListing};
use crate::jobs::scraper::{JobScraper, ScrapeQuery};
use crate::jobs::status::JobStatusTracker;
use crate::store::BlobStore;

/// Scrape knobs shared by every role search in one run.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub sites: Vec<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
}

impl ScrapeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sites: config.scrape_sites.clone(),
            results_wanted: config.scrape_results_wanted,
            hours_old: config.scrape_hours_old,
        }
    }
}

/// Path of the transient listings artifact for one correlation id. Written
/// here on success, consumed and deleted by the notification channel.
pub fn artifact_path(client_id: &str) -> PathBuf {
    std::env::temp_dir().join(format!("job_results_{client_id}.json"))
}

/// Runs the whole search for one correlation id and records the outcome.
/// A failure for any single role fails the run; partial results are not
/// treated as success and nothing is stored.
pub async fn run_job_search(
    scraper: Arc<dyn JobScraper>,
    store: Arc<dyn BlobStore>,
    tracker: JobStatusTracker,
    settings: ScrapeSettings,
    roles: Vec<String>,
    client_id: String,
    user_id: String,
    location: String,
) {
    info!(
        %client_id,
        %user_id,
        roles = roles.len(),
        %location,
        "starting background job search"
    );
    match execute(scraper, store, &settings, roles, &client_id, &user_id, &location).await {
        Ok(count) => {
            info!(%client_id, listings = count, "job search finished");
            tracker.complete(&client_id, "Job search complete");
        }
        Err(e) => {
            error!(%client_id, "job search failed: {e:#}");
            tracker.fail(&client_id, &e.to_string());
        }
    }
}

async fn execute(
    scraper: Arc<dyn JobScraper>,
    store: Arc<dyn BlobStore>,
    settings: &ScrapeSettings,
    roles: Vec<String>,
    client_id: &str,
    user_id: &str,
    location: &str,
) -> Result<usize> {
    let mut all_rows = Vec::new();
    for role in &roles {
        let query = ScrapeQuery {
            site_name: settings.sites.clone(),
            search_term: role.clone(),
            location: location.to_string(),
            results_wanted: settings.results_wanted,
            hours_old: settings.hours_old,
            linkedin_fetch_description: true,
        };
        let rows = scraper
            .scrape(&query)
            .await
            .with_context(|| format!("scrape failed for role '{role}'"))?;
        info!(%role, rows = rows.len(), "scraped role");
        all_rows.extend(rows);
    }

    let listings: Vec<JobListing> = normalize_rows(all_rows);
    let blob = serde_json::to_string(&listings).context("failed to serialize listings")?;

    tokio::fs::write(artifact_path(client_id), &blob)
        .await
        .context("failed to write listings artifact")?;

    store
        .upsert(user_id, &blob)
        .await
        .context("failed to store listings")?;

    Ok(listings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::scraper::{RawJobRow, ScrapeError};
    use crate::jobs::status::JobState;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct FakeScraper {
        /// Role whose scrape call fails; every other role yields one row.
        failing_role: Option<String>,
    }

    #[async_trait]
    impl JobScraper for FakeScraper {
        async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<RawJobRow>, ScrapeError> {
            if self.failing_role.as_deref() == Some(query.search_term.as_str()) {
                return Err(ScrapeError::Api {
                    status: 502,
                    message: "upstream board unavailable".to_string(),
                });
            }
            Ok(vec![RawJobRow {
                job_url: Some(format!("https://jobs.example/{}", query.search_term)),
                title: Some(query.search_term.clone()),
                ..Default::default()
            }])
        }
    }

    fn settings() -> ScrapeSettings {
        ScrapeSettings {
            sites: vec!["indeed".to_string()],
            results_wanted: 20,
            hours_old: 72,
        }
    }

    #[tokio::test]
    async fn test_successful_search_stores_listings_and_completes() {
        let store = Arc::new(MemoryStore::new());
        let tracker = JobStatusTracker::new();
        let client_id = "test-search-ok";
        tracker.register(client_id, "Job search started");

        run_job_search(
            Arc::new(FakeScraper { failing_role: None }),
            store.clone(),
            tracker.clone(),
            settings(),
            vec!["Backend Engineer".to_string(), "Data Analyst".to_string()],
            client_id.to_string(),
            "user-7".to_string(),
            "India".to_string(),
        )
        .await;

        let entry = tracker.get(client_id).unwrap();
        assert_eq!(entry.state, JobState::Completed);

        let blob = store.get("user-7").await.unwrap().expect("listings stored");
        let listings: Vec<JobListing> = serde_json::from_str(&blob).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "Backend Engineer");
        assert_eq!(listings[1].title, "Data Analyst");

        let path = artifact_path(client_id);
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_single_role_failure_fails_whole_run_and_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let tracker = JobStatusTracker::new();
        let client_id = "test-search-partial";
        tracker.register(client_id, "Job search started");

        run_job_search(
            Arc::new(FakeScraper {
                failing_role: Some("Data Analyst".to_string()),
            }),
            store.clone(),
            tracker.clone(),
            settings(),
            vec!["Backend Engineer".to_string(), "Data Analyst".to_string()],
            client_id.to_string(),
            "user-8".to_string(),
            "India".to_string(),
        )
        .await;

        let entry = tracker.get(client_id).unwrap();
        assert_eq!(entry.state, JobState::Failed);
        assert!(entry.message.contains("Data Analyst"));
        assert!(store.get("user-8").await.unwrap().is_none());
        assert!(!artifact_path(client_id).exists());
    }
}
