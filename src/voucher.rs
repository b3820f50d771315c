use anyhow::{anyhow, Result};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Map, Value};

use crate::datastore::store::BoxStore;
use crate::keys;

/// Uppercase letters and digits without the visually ambiguous 0, 1, I, O.
const CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;
const MAX_ATTEMPTS: u32 = 10;

pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();

    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Draw codes until one is not already stored. Prior codes of the same batch
/// were written before this call, so intra-batch duplicates are caught too.
/// Running out of attempts fails the request, a possibly duplicate code is
/// never stored.
async fn unique_code(store: &BoxStore) -> Result<String> {
    for _ in 0..MAX_ATTEMPTS {
        let code = generate_code();

        if store.get(keys::voucher_key(code.as_str()).as_str()).await?.is_none() {
            return Ok(code);
        }
    }

    Err(anyhow!("{}", format!("No unique voucher code found after {} attempts", MAX_ATTEMPTS)))
}

/// Create `count` vouchers from the caller's template (profile, bandwidth,
/// validity, ...) and store each one under `voucher:<code>`.
pub async fn create_vouchers(store: &BoxStore, count: u32, template: &Map<String, Value>) -> Result<Vec<Value>> {
    let mut vouchers: Vec<Value> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let code = unique_code(store).await?;
        let id = keys::voucher_key(code.as_str());

        let mut doc = template.clone();
        doc.insert("id".to_string(), json!(id));
        doc.insert("code".to_string(), json!(code));
        doc.insert("used".to_string(), json!(false));
        doc.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));

        let voucher = Value::Object(doc);
        store.set(id.as_str(), &voucher).await?;
        vouchers.push(voucher);
    }

    Ok(vouchers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::store_mem::MemStore;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = generate_code();

            assert_eq!(CODE_LEN, code.len());
            assert!(code.bytes().all(|c| CODE_CHARS.contains(&c)));
        }
    }

    #[tokio::test]
    async fn test_create_vouchers() {
        let store: BoxStore = Box::new(MemStore::new());

        let mut template = Map::new();
        template.insert("profile".to_string(), json!("1Hour"));
        template.insert("bandwidth".to_string(), json!("2M/2M"));
        template.insert("validity".to_string(), json!("1 Day"));

        let vouchers = create_vouchers(&store, 3, &template).await.unwrap();

        assert_eq!(3, vouchers.len());

        let mut codes: HashSet<String> = HashSet::new();
        for v in vouchers.iter() {
            let code = v["code"].as_str().unwrap();

            assert_eq!(CODE_LEN, code.len());
            assert_eq!(json!(false), v["used"]);
            assert_eq!(json!("1Hour"), v["profile"]);
            assert_eq!(json!("2M/2M"), v["bandwidth"]);
            assert_eq!(json!("1 Day"), v["validity"]);
            assert!(v.get("createdAt").is_some());

            codes.insert(code.to_string());
        }

        // All codes distinct and all records stored
        assert_eq!(3, codes.len());
        assert_eq!(3, store.get_by_prefix(keys::VOUCHER_PREFIX).await.unwrap().len());
    }

    #[tokio::test]
    async fn test_voucher_template_never_overrides_server_fields() {
        let store: BoxStore = Box::new(MemStore::new());

        let mut template = Map::new();
        template.insert("used".to_string(), json!(true));

        let vouchers = create_vouchers(&store, 1, &template).await.unwrap();

        assert_eq!(json!(false), vouchers[0]["used"]);
    }
}
