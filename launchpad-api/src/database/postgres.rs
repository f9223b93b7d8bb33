//! PostgreSQL keypair pool with runtime queries (no compile-time checking)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::info;
use vanity_miner::{
    KeypairAllocator, KeypairSink, KeypairStatus, NewVanityKeypair, PoolBreakdown, PoolStats,
    PoolStatsProvider, StoreError, VanityKeypairRecord,
};

use crate::config::DatabaseConfig;

// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresKeypairStore {
    pub pool: PgPool,
}

impl PostgresKeypairStore {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.postgres_url)
            .await?;

        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations applied");
        }

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn backend_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn count(row: &PgRow, column: &str) -> Result<u64, StoreError> {
    let value: i64 = row.try_get(column).map_err(backend_error)?;
    Ok(value.max(0) as u64)
}

fn stats_from_row(row: &PgRow) -> Result<PoolStats, StoreError> {
    Ok(PoolStats {
        total: count(row, "total")?,
        available: count(row, "available")?,
        reserved: count(row, "reserved")?,
        used: count(row, "used")?,
    })
}

fn record_from_row(row: &PgRow) -> Result<VanityKeypairRecord, StoreError> {
    let status: String = row.try_get("status").map_err(backend_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(backend_error)?;
    Ok(VanityKeypairRecord {
        public_key: row.try_get("public_key").map_err(backend_error)?,
        secret_key_encrypted: row.try_get("secret_key_encrypted").map_err(backend_error)?,
        suffix: row.try_get("suffix").map_err(backend_error)?,
        status: status.parse()?,
        created_at,
    })
}

const STATS_COLUMNS: &str = r#"
    COUNT(*) AS total,
    COUNT(*) FILTER (WHERE status = 'available') AS available,
    COUNT(*) FILTER (WHERE status = 'reserved') AS reserved,
    COUNT(*) FILTER (WHERE status = 'used') AS used
"#;

#[async_trait]
impl PoolStatsProvider for PostgresKeypairStore {
    async fn pool_stats(&self, suffix: &str) -> Result<PoolStats, StoreError> {
        let query = format!("SELECT {} FROM vanity_keypairs WHERE suffix = $1", STATS_COLUMNS);

        let row = sqlx::query(&query)
            .bind(suffix.to_ascii_lowercase())
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)?;

        stats_from_row(&row)
    }

    async fn pool_breakdown(&self) -> Result<PoolBreakdown, StoreError> {
        let query = format!(
            "SELECT suffix, {} FROM vanity_keypairs GROUP BY suffix ORDER BY suffix",
            STATS_COLUMNS
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        let mut breakdown = PoolBreakdown::new();
        for row in rows {
            let suffix: String = row.try_get("suffix").map_err(backend_error)?;
            breakdown.insert(suffix, stats_from_row(&row)?);
        }
        Ok(breakdown)
    }
}

#[async_trait]
impl KeypairSink for PostgresKeypairStore {
    async fn save_keypair(&self, keypair: &NewVanityKeypair) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO vanity_keypairs (public_key, secret_key_encrypted, suffix, status)
            VALUES ($1, $2, $3, $4)
        "#;

        sqlx::query(query)
            .bind(&keypair.public_key)
            .bind(&keypair.secret_key_encrypted)
            .bind(keypair.suffix.to_ascii_lowercase())
            .bind(KeypairStatus::Available.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
                {
                    StoreError::Duplicate {
                        public_key: keypair.public_key.clone(),
                    }
                }
                _ => backend_error(err),
            })?;

        Ok(())
    }
}

#[async_trait]
impl KeypairAllocator for PostgresKeypairStore {
    async fn reserve_keypair(&self, suffix: &str) -> Result<Option<VanityKeypairRecord>, StoreError> {
        // SKIP LOCKED lets concurrent launches each take a different key
        let query = r#"
            UPDATE vanity_keypairs
            SET status = 'reserved', reserved_at = NOW()
            WHERE id = (
                SELECT id FROM vanity_keypairs
                WHERE suffix = $1 AND status = 'available'
                ORDER BY created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING public_key, secret_key_encrypted, suffix, status, created_at
        "#;

        let row = sqlx::query(query)
            .bind(suffix.to_ascii_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn mark_used(&self, public_key: &str) -> Result<(), StoreError> {
        let query = r#"
            UPDATE vanity_keypairs
            SET status = 'used', used_at = NOW()
            WHERE public_key = $1 AND status = 'reserved'
        "#;

        let result = sqlx::query(query)
            .bind(public_key)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(public_key.to_string()));
        }
        Ok(())
    }

    async fn release_keypair(&self, public_key: &str) -> Result<(), StoreError> {
        let query = r#"
            UPDATE vanity_keypairs
            SET status = 'available', reserved_at = NULL
            WHERE public_key = $1 AND status = 'reserved'
        "#;

        let result = sqlx::query(query)
            .bind(public_key)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(public_key.to_string()));
        }
        Ok(())
    }
}
