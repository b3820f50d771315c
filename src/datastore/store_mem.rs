use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::datastore::store::Store;

/// In-memory store keeping documents in a sorted map. Used by the test suite
/// and as a throwaway dev mode, the contracts are the same as the Postgres
/// backend but nothing survives a restart.
#[derive(Default, Clone)]
pub struct MemStore {
    data: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get(&self, k: &str) -> Result<Option<Value>> {
        let data = self.data.read().unwrap();

        Ok(data.get(k).cloned())
    }

    async fn set(&self, k: &str, v: &Value) -> Result<()> {
        let mut data = self.data.write().unwrap();
        data.insert(k.to_string(), v.clone());

        Ok(())
    }

    async fn delete(&self, k: &str) -> Result<()> {
        let mut data = self.data.write().unwrap();
        data.remove(k);

        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Value>> {
        let data = self.data.read().unwrap();

        Ok(keys.iter().filter_map(|k| data.get(k).cloned()).collect())
    }

    async fn mset(&self, keys: &[String], values: &[Value]) -> Result<()> {
        if keys.len() != values.len() {
            return Err(anyhow!("{}", format!("mset: got {} keys for {} values", keys.len(), values.len())));
        }

        // Single write lock, the batch is applied as a whole
        let mut data = self.data.write().unwrap();
        for (k, v) in keys.iter().zip(values.iter()) {
            data.insert(k.to_string(), v.clone());
        }

        Ok(())
    }

    async fn mdel(&self, keys: &[String]) -> Result<()> {
        let mut data = self.data.write().unwrap();
        for k in keys.iter() {
            data.remove(k);
        }

        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let data = self.data.read().unwrap();

        Ok(data.range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}
