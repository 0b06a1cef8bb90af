use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{save, SaveOptions};

#[derive(Serialize)]
pub struct CrawlResponse {
    pub status: &'static str,
    pub inserted: usize,
    pub skipped: usize,
}

/// GET /crawl
/// Runs every source and stores the result. Source failures only shrink the
/// result; a store failure fails the request.
pub async fn handle_crawl(State(state): State<AppState>) -> Result<Json<CrawlResponse>, AppError> {
    let grouped = state.aggregator.run_all().await;
    let options = SaveOptions {
        dedup_by_url: state.config.crawl.dedup_by_url,
    };
    let report = save(
        state.store.as_ref(),
        grouped.into_values().flatten(),
        options,
        Utc::now(),
    )
    .await?;

    Ok(Json(CrawlResponse {
        status: "ok",
        inserted: report.inserted,
        skipped: report.skipped,
    }))
}
