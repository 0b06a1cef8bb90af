use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::Listing;
use crate::store::{ListingStore, StoreError};

/// `listings` table; ids come from the `listing_id_seq` sequence.
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn allocate_id(&self) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar("SELECT nextval('listing_id_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn put(&self, listing: &Listing) -> Result<(), StoreError> {
        let d = &listing.draft;
        // created_at of an existing row wins; it is the first-write stamp
        sqlx::query(
            r#"
            INSERT INTO listings
                (id, url, board, title, content, date, start_at, end_at, kind,
                 major, grade, price, etc, campus, certificates, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (id) DO UPDATE SET
                url = EXCLUDED.url,
                board = EXCLUDED.board,
                title = EXCLUDED.title,
                content = EXCLUDED.content,
                date = EXCLUDED.date,
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                kind = EXCLUDED.kind,
                major = EXCLUDED.major,
                grade = EXCLUDED.grade,
                price = EXCLUDED.price,
                etc = EXCLUDED.etc,
                campus = EXCLUDED.campus,
                certificates = EXCLUDED.certificates,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(listing.id)
        .bind(&d.url)
        .bind(&d.board)
        .bind(&d.title)
        .bind(&d.content)
        .bind(&d.date)
        .bind(&d.start_at)
        .bind(&d.end_at)
        .bind(&d.kind)
        .bind(&d.major)
        .bind(&d.grade)
        .bind(&d.price)
        .bind(&d.etc)
        .bind(&d.campus)
        .bind(&d.certificates)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        Ok(
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn scan(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(
            sqlx::query_as::<_, Listing>("SELECT * FROM listings ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}
