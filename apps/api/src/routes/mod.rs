pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::crawl::handlers as crawl;
use crate::listings::handlers as listings;
use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Résumé uploads are the largest bodies the service accepts.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::banner_handler))
        .route("/api/health", get(health::health_handler))
        // Crawl
        .route("/crawl", get(crawl::handle_crawl))
        // Listings
        .route("/api/list", get(listings::handle_list))
        .route("/api/scholarships", get(listings::handle_scholarships))
        .route("/api/scholarships/:id", get(listings::handle_get_scholarship))
        .route("/upload-json", post(listings::handle_upload_json))
        // Matching
        .route("/api/filter-scholarships", post(matching::handle_filter_scholarships))
        .route("/api/resumes", post(matching::handle_resumes))
        .route("/upload-pdf", post(resume::handle_upload_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
