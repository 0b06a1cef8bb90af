use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Listing;
use crate::store::{ListingStore, StoreError};

/// Process-local store, used for `STORE_BACKEND=memory` and in tests.
#[derive(Default)]
pub struct MemoryListingStore {
    next_id: AtomicI64,
    rows: RwLock<BTreeMap<i64, Listing>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn allocate_id(&self) -> Result<i64, StoreError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn put(&self, listing: &Listing) -> Result<(), StoreError> {
        self.rows.write().await.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn scan(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingDraft;
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_allocations_are_unique() {
        let store = Arc::new(MemoryListingStore::new());
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move { store.allocate_id().await.unwrap() }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(ids.first(), Some(&1));
    }

    #[tokio::test]
    async fn test_put_get_scan() {
        let store = MemoryListingStore::new();
        assert_eq!(store.get(1).await.unwrap(), None);

        let listing = Listing::stamp(5, ListingDraft::new("b"), Utc::now());
        store.put(&listing).await.unwrap();
        store
            .put(&Listing::stamp(2, ListingDraft::new("a"), Utc::now()))
            .await
            .unwrap();

        assert_eq!(store.get(5).await.unwrap(), Some(listing));
        let ids: Vec<_> = store.scan().await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }
}
