use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::datastore::store::{Store, StoreConfig};

const DEFAULT_TABLE: &str = "kv_store";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
}

impl PgStore {
    pub async fn init(config: &StoreConfig) -> Result<Self> {
        if config.conn_str.is_empty() {
            return Err(anyhow!("Datastore's conn_str must be set for the pgsql kind"));
        }

        let max_conn = config.options.get("max_conn")
            .and_then(|v| v.as_u64())
            .unwrap_or(5) as u32;

        let table = config.options.get("table")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_TABLE)
            .to_string();

        let pool = PgPoolOptions::new()
            .max_connections(max_conn)
            .connect(config.conn_str.as_str())
            .await?;

        // Ensure the table exists on first connection
        sqlx::query(format!("CREATE TABLE IF NOT EXISTS {} (key TEXT NOT NULL PRIMARY KEY, value JSONB NOT NULL)", table).as_str())
            .execute(&pool)
            .await?;

        Ok(PgStore { pool, table })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get(&self, k: &str) -> Result<Option<Value>> {
        let row = sqlx::query(format!("SELECT value FROM {} WHERE key = $1 LIMIT 1", self.table).as_str())
            .bind(k)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("value")?)),
            None => {
                debug!("Getting '{}' returns None", k);

                Ok(None)
            },
        }
    }

    async fn set(&self, k: &str, v: &Value) -> Result<()> {
        sqlx::query(format!("INSERT INTO {} (key, value) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value", self.table).as_str())
            .bind(k)
            .bind(v)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, k: &str) -> Result<()> {
        sqlx::query(format!("DELETE FROM {} WHERE key = $1", self.table).as_str())
            .bind(k)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Value>> {
        let rows = sqlx::query(format!("SELECT key, value FROM {} WHERE key = ANY($1)", self.table).as_str())
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;

        let mut found: HashMap<String, Value> = HashMap::new();
        for r in rows.iter() {
            found.insert(r.try_get("key")?, r.try_get("value")?);
        }

        // The query returns rows in arbitrary order, realign on the input.
        // A key listed twice yields its value twice, as the memory backend does.
        Ok(keys.iter().filter_map(|k| found.get(k).cloned()).collect())
    }

    async fn mset(&self, keys: &[String], values: &[Value]) -> Result<()> {
        if keys.len() != values.len() {
            return Err(anyhow!("{}", format!("mset: got {} keys for {} values", keys.len(), values.len())));
        }

        let mut tx = self.pool.begin().await?;

        for (k, v) in keys.iter().zip(values.iter()) {
            sqlx::query(format!("INSERT INTO {} (key, value) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value", self.table).as_str())
                .bind(k)
                .bind(v)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn mdel(&self, keys: &[String]) -> Result<()> {
        sqlx::query(format!("DELETE FROM {} WHERE key = ANY($1)", self.table).as_str())
            .bind(keys)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let pattern = format!("{}%", escape_like(prefix));

        let rows = sqlx::query(format!("SELECT value FROM {} WHERE key LIKE $1", self.table).as_str())
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        let mut docs: Vec<Value> = Vec::with_capacity(rows.len());
        for r in rows.iter() {
            docs.push(r.try_get("value")?);
        }

        Ok(docs)
    }
}

/// Escape LIKE metacharacters so a prefix is always matched literally.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!("router:", escape_like("router:"));
        assert_eq!("a\\%b", escape_like("a%b"));
        assert_eq!("a\\_b", escape_like("a_b"));
        assert_eq!("a\\\\\\%b", escape_like("a\\%b"));
    }
}
