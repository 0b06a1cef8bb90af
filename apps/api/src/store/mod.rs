//! Listing persistence.
//!
//! Handlers and the crawl pipeline only see [`ListingStore`]. Ids always come
//! from the backend's atomic counter (`allocate_id`), so two writers can never
//! be handed the same id.

pub mod memory;
pub mod postgres;
pub mod redis;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Listing, ListingDraft};

pub use memory::MemoryListingStore;
pub use postgres::PgListingStore;
pub use self::redis::RedisListingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Next id from the backend's atomic counter. Never returns the same id twice.
    async fn allocate_id(&self) -> Result<i64, StoreError>;

    /// Inserts or replaces the listing stored under `listing.id`.
    async fn put(&self, listing: &Listing) -> Result<(), StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Listing>, StoreError>;

    /// Every stored listing, ordered by id.
    async fn scan(&self) -> Result<Vec<Listing>, StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub inserted: usize,
    pub skipped: usize,
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Skip drafts whose URL is already stored or repeated in the batch.
    pub dedup_by_url: bool,
}

/// Persists `drafts` in order: each gets a fresh id and the write timestamp `now`.
pub async fn save(
    store: &dyn ListingStore,
    drafts: impl IntoIterator<Item = ListingDraft>,
    options: SaveOptions,
    now: DateTime<Utc>,
) -> Result<SaveReport, StoreError> {
    let mut seen_urls: HashSet<String> = if options.dedup_by_url {
        store
            .scan()
            .await?
            .into_iter()
            .filter_map(|l| l.draft.url)
            .collect()
    } else {
        HashSet::new()
    };

    let mut report = SaveReport::default();
    for draft in drafts {
        if options.dedup_by_url {
            if let Some(url) = &draft.url {
                if !seen_urls.insert(url.clone()) {
                    debug!("Already stored, skipping {url}");
                    report.skipped += 1;
                    continue;
                }
            }
        }

        let id = store.allocate_id().await?;
        store.put(&Listing::stamp(id, draft, now)).await?;
        report.ids.push(id);
        report.inserted += 1;
    }

    info!(
        "Saved {} listings ({} skipped as duplicates)",
        report.inserted, report.skipped
    );
    Ok(report)
}
