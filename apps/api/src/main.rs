mod analysis;
mod config;
mod errors;
mod geo;
mod jobs;
mod llm_client;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_dynamodb::config::Credentials;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::scraper::HttpJobScraper;
use crate::jobs::status::JobStatusTracker;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::DynamoTable;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resumatch_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize DynamoDB
    let dynamo = build_dynamo_client(&config).await;
    info!("DynamoDB client initialized");

    // Initialize AI client
    let llm = LlmClient::new(config.genai_api_key.clone());
    info!("AI client initialized (model: {})", llm_client::MODEL);

    // Initialize scraping collaborator client
    let scraper = Arc::new(HttpJobScraper::new(config.scraper_url.clone()));
    info!("Scraper client initialized ({})", config.scraper_url);

    // Build app state
    let state = AppState {
        ats_store: Arc::new(DynamoTable::new(
            dynamo.clone(),
            config.ats_table.clone(),
            "userId",
        )),
        jobs_store: Arc::new(DynamoTable::new(
            dynamo.clone(),
            config.jobs_table.clone(),
            "userId",
        )),
        resume_store: Arc::new(DynamoTable::new(
            dynamo,
            config.resumes_table.clone(),
            "resumeId",
        )),
        llm,
        scraper,
        job_status: JobStatusTracker::new(),
        http: reqwest::Client::new(),
        config: config.clone(),
        guest_seq: Arc::new(AtomicU64::new(1)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs a DynamoDB client for AWS or DynamoDB Local.
async fn build_dynamo_client(config: &Config) -> aws_sdk_dynamodb::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resumatch-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials);

    if let Some(endpoint) = &config.dynamo_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    aws_sdk_dynamodb::Client::new(&loader.load().await)
}
