mod config;
mod crawl;
mod db;
mod errors;
mod extract;
mod listings;
mod llm_client;
mod matching;
mod models;
mod normalize;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::crawl::aggregator::Aggregator;
use crate::crawl::fetch::HttpFetcher;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::normalize::MajorNormalizer;
use crate::resume::{DisabledExtractor, LlmProfileExtractor, ProfileExtractor};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ListingStore, MemoryListingStore, PgListingStore, RedisListingStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing store URL)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scholarship API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;

    let fetcher = Arc::new(HttpFetcher::new(config.crawl.timeout)?);
    let aggregator = Aggregator::from_config(fetcher, &config.crawl);
    info!("Crawler configured with {} sources", aggregator.source_count());

    let extractor: Arc<dyn ProfileExtractor> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmProfileExtractor::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, résumé uploads will yield an empty profile");
            Arc::new(DisabledExtractor)
        }
    };

    let majors = MajorNormalizer::load(config.major_synonyms_path.as_deref())?;

    // Build app state
    let state = AppState {
        store,
        aggregator: Arc::new(aggregator),
        extractor,
        majors: Arc::new(majors),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn ListingStore>> {
    let store: Arc<dyn ListingStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().context("DATABASE_URL is not set")?;
            let pool = create_pool(url).await?;
            info!("Using PostgreSQL listing store");
            Arc::new(PgListingStore::new(pool))
        }
        StoreBackend::Redis => {
            let url = config.redis_url.as_deref().context("REDIS_URL is not set")?;
            let client = redis::Client::open(url).context("Invalid REDIS_URL")?;
            let store = RedisListingStore::connect(&client)
                .await
                .context("Failed to connect to Redis")?;
            info!("Using Redis listing store");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory listing store; data is lost on restart");
            Arc::new(MemoryListingStore::new())
        }
    };
    Ok(store)
}
