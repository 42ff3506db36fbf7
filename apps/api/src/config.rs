use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    /// Optional endpoint override for DynamoDB Local.
    pub dynamo_endpoint: Option<String>,
    pub genai_api_key: String,
    pub ats_table: String,
    pub jobs_table: String,
    pub resumes_table: String,
    /// Base URL of the JobSpy-compatible scraping service.
    pub scraper_url: String,
    pub scrape_sites: Vec<String>,
    pub scrape_results_wanted: u32,
    pub scrape_hours_old: u32,
    /// Region used for job searches when client geolocation fails.
    pub default_location: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "ap-south-1".to_string()),
            dynamo_endpoint: std::env::var("DYNAMODB_ENDPOINT").ok(),
            genai_api_key: require_env("GENAI_API_KEY")?,
            ats_table: std::env::var("ATS_TABLE").unwrap_or_else(|_| "Resume-Response".to_string()),
            jobs_table: std::env::var("JOBS_TABLE").unwrap_or_else(|_| "JobData".to_string()),
            resumes_table: std::env::var("RESUMES_TABLE")
                .unwrap_or_else(|_| "SharableResumes".to_string()),
            scraper_url: require_env("SCRAPER_URL")?,
            scrape_sites: std::env::var("SCRAPE_SITES")
                .unwrap_or_else(|_| "glassdoor,google,indeed".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            scrape_results_wanted: parse_env("SCRAPE_RESULTS_WANTED", 20)?,
            scrape_hours_old: parse_env("SCRAPE_HOURS_OLD", 72)?,
            default_location: std::env::var("DEFAULT_LOCATION")
                .unwrap_or_else(|_| "India".to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
