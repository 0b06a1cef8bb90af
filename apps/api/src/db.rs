use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_SEQUENCE: &str = "CREATE SEQUENCE IF NOT EXISTS listing_id_seq";

const CREATE_LISTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS listings (
    id           BIGINT PRIMARY KEY,
    url          TEXT,
    board        TEXT NOT NULL,
    title        TEXT,
    content      TEXT,
    date         TEXT,
    start_at     TEXT,
    end_at       TEXT,
    kind         TEXT,
    major        TEXT,
    grade        TEXT,
    price        TEXT,
    etc          TEXT,
    campus       TEXT,
    certificates TEXT[] NOT NULL DEFAULT '{}',
    created_at   TIMESTAMPTZ NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL
)
"#;

/// Creates a PostgreSQL connection pool and makes sure the listings schema exists.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    // one statement per query: prepared statements cannot hold two
    for statement in [CREATE_SEQUENCE, CREATE_LISTINGS] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .context("Failed to create listings schema")?;
    }

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
