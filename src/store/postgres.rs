use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};

use super::{CollectionStore, PutOutcome, VersionedBlob};

/// Collection store backed by a single Postgres table. Every collection is
/// one JSONB row; the `version` column carries the optimistic-concurrency
/// token.
#[derive(Clone)]
pub struct PgCollectionStore {
    pool: PgPool,
}

impl PgCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for PgCollectionStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedBlob>> {
        let row = sqlx::query("SELECT value, version FROM kv_collections WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| VersionedBlob {
            value: r.get::<JsonValue, _>("value"),
            version: r.get::<i64, _>("version"),
        }))
    }

    async fn put(&self, key: &str, value: JsonValue, expected: Option<i64>) -> Result<PutOutcome> {
        match expected {
            None => {
                let row = sqlx::query(
                    "INSERT INTO kv_collections (key, value, version) VALUES ($1, $2, 1) \
                     ON CONFLICT (key) DO NOTHING RETURNING version",
                )
                .bind(key)
                .bind(&value)
                .fetch_optional(&self.pool)
                .await?;

                match row {
                    Some(r) => Ok(PutOutcome::Stored(r.get::<i64, _>("version"))),
                    None => Ok(PutOutcome::Conflict),
                }
            }
            Some(version) => {
                let row = sqlx::query(
                    "UPDATE kv_collections SET value = $2, version = version + 1, updated_at = NOW() \
                     WHERE key = $1 AND version = $3 RETURNING version",
                )
                .bind(key)
                .bind(&value)
                .bind(version)
                .fetch_optional(&self.pool)
                .await?;

                match row {
                    Some(r) => Ok(PutOutcome::Stored(r.get::<i64, _>("version"))),
                    None => Ok(PutOutcome::Conflict),
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_collections WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let rows = sqlx::query("SELECT key FROM kv_collections WHERE key LIKE $1 ORDER BY key")
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("key")).collect())
    }
}
