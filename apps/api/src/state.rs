use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::config::Config;
use crate::jobs::scraper::JobScraper;
use crate::jobs::status::JobStatusTracker;
use crate::llm_client::LlmClient;
use crate::store::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Analysis blobs keyed by user id.
    pub ats_store: Arc<dyn BlobStore>,
    /// Normalized job-listing blobs keyed by user id.
    pub jobs_store: Arc<dyn BlobStore>,
    /// Shareable résumé extractions keyed by resume id.
    pub resume_store: Arc<dyn BlobStore>,
    pub llm: LlmClient,
    /// Pluggable scraping collaborator. Default: HttpJobScraper against SCRAPER_URL.
    pub scraper: Arc<dyn JobScraper>,
    /// Correlation-id → scrape lifecycle state, shared between the request
    /// path, the orchestrator task, and the notification channel.
    pub job_status: JobStatusTracker,
    /// Shared HTTP client for geolocation lookups.
    pub http: reqwest::Client,
    pub config: Config,
    /// Counter backing generated `testaccount-NN` fallback user ids.
    pub guest_seq: Arc<AtomicU64>,
}
