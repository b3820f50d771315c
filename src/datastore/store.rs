use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use serde_json::{Value, Map};

use crate::datastore::store_mem::MemStore;
use crate::datastore::store_pgsql::PgStore;

pub type BoxStore = Box<dyn Store + Send + Sync>;

/// Key-value interface shared by every domain handler.
///
/// Keys are plain strings partitioned by convention into prefix namespaces
/// (`router:`, `user:`, ...), values are opaque JSON documents. `get` returns
/// None for a missing key and `delete` is a no-op when the key is absent,
/// neither is an error.
#[async_trait]
pub trait Store: StoreClone {
    async fn get(&self, k: &str) -> Result<Option<Value>>;
    /// Upsert: a second set for the same key replaces the whole value.
    async fn set(&self, k: &str, v: &Value) -> Result<()>;
    async fn delete(&self, k: &str) -> Result<()>;
    /// Batch get. Results come back in input-key order, absent keys skipped.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Value>>;
    /// Batch upsert, all-or-nothing.
    async fn mset(&self, keys: &[String], values: &[Value]) -> Result<()>;
    async fn mdel(&self, keys: &[String]) -> Result<()>;
    /// Every document whose key starts with `prefix`, taken literally even
    /// when the prefix contains pattern metacharacters.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>>;
}

pub trait StoreClone {
    fn clone_box(&self) -> BoxStore;
}

impl<T> StoreClone for T
where
    T: 'static + Store + Send + Sync + Clone,
{
    fn clone_box(&self) -> BoxStore {
        Box::new(self.clone())
    }
}

impl Clone for BoxStore {
    fn clone(&self) -> BoxStore {
        self.clone_box()
    }
}

/// Store configuration
///
/// `conn_str` is the connection string of the backing store. For the `pgsql`
/// kind it is a Postgres URL and must be set, for `memory` it is ignored.
/// Backend specific settings (max_conn, table) go into `options`.
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub kind: String,
    pub conn_str: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl StoreConfig {
    pub async fn new_store(&self) -> Result<BoxStore> {
        let db: BoxStore = match self.kind.as_str() {
            "pgsql" => Box::new(PgStore::init(&self).await?),
            "memory" => Box::new(MemStore::new()),
            _ => return Err(anyhow!("{}", format!("Datastore's kind {} not supported!", self.kind))),
        };

        Ok(db)
    }
}
