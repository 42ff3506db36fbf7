//! Client for the external job-scraping collaborator.
//!
//! The collaborator is a JobSpy-compatible HTTP service: given a site list,
//! a search term, a location, a results cap, and a recency window it returns
//! a tabular record set where any column may be absent per row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scraper API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// One search request against the scraping collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeQuery {
    pub site_name: Vec<String>,
    pub search_term: String,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub linkedin_fetch_description: bool,
}

/// A raw scraped row. Every column may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobRow {
    pub job_url: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
    pub is_remote: Option<bool>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    jobs: Vec<RawJobRow>,
}

/// Seam for the scraping collaborator so orchestration can be tested
/// without the external service.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<RawJobRow>, ScrapeError>;
}

/// Production implementation: POSTs the query to the scraping service.
pub struct HttpJobScraper {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobScraper {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                // Scrapes fan out to several job boards; give them room.
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl JobScraper for HttpJobScraper {
    async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<RawJobRow>, ScrapeError> {
        let url = format!("{}/scrape", self.base_url.trim_end_matches('/'));
        let response = self.client.post(&url).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ScrapeResponse = response.json().await?;
        Ok(parsed.jobs)
    }
}
