use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::models::Listing;
use crate::store::{ListingStore, StoreError};

const SEQ_KEY: &str = "listings:next_id";
/// Sorted set of stored ids, score = id.
const INDEX_KEY: &str = "listings:ids";

fn listing_key(id: i64) -> String {
    format!("listing:{id}")
}

/// Listings as JSON strings under `listing:<id>`; ids from `INCR`.
#[derive(Clone)]
pub struct RedisListingStore {
    conn: MultiplexedConnection,
}

impl RedisListingStore {
    pub async fn connect(client: &redis::Client) -> Result<Self, StoreError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ListingStore for RedisListingStore {
    async fn allocate_id(&self) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let id: i64 = conn.incr(SEQ_KEY, 1).await?;
        Ok(id)
    }

    async fn put(&self, listing: &Listing) -> Result<(), StoreError> {
        let json = serde_json::to_string(listing)?;
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(listing_key(listing.id), json)
            .ignore()
            .zadd(INDEX_KEY, listing.id, listing.id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(listing_key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn scan(&self) -> Result<Vec<Listing>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<i64> = conn.zrange(INDEX_KEY, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().copied().map(listing_key).collect();
        let raw: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let mut listings = Vec::with_capacity(raw.len());
        for (id, json) in ids.iter().zip(raw) {
            match json {
                Some(json) => listings.push(serde_json::from_str(&json)?),
                None => warn!("Index lists listing {id} but its key is missing"),
            }
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(listing_key(42), "listing:42");
    }
}
