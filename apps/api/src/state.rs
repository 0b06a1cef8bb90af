use std::sync::Arc;

use crate::config::Config;
use crate::crawl::aggregator::Aggregator;
use crate::normalize::MajorNormalizer;
use crate::resume::ProfileExtractor;
use crate::store::ListingStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres, Redis or in-memory, chosen by `STORE_BACKEND`.
    pub store: Arc<dyn ListingStore>,
    pub aggregator: Arc<Aggregator>,
    /// `DisabledExtractor` when no LLM key is configured.
    pub extractor: Arc<dyn ProfileExtractor>,
    pub majors: Arc<MajorNormalizer>,
    pub config: Config,
}
