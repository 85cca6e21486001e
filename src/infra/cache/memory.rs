use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::application::ports::{CacheError, CacheStore};

/// In-process cache store for tests and cache-less deployments.
///
/// Expiry is logical: entries past `expires_at` are reported absent but only
/// reclaimed when overwritten or deleted.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

struct Entry {
    value: serde_json::Value,
    expires_at: OffsetDateTime,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let guard = self.entries.read().await;
        let now = OffsetDateTime::now_utc();
        Ok(guard
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut guard = self.entries.write().await;
        guard.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: OffsetDateTime::now_utc() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut guard = self.entries.write().await;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_and_overwrite() {
        let store = MemoryCacheStore::new();
        let key = "demo-all-documents";

        assert!(store.get(key).await.expect("get").is_none());

        store
            .set(key, &serde_json::json!(["a"]), Duration::from_secs(60))
            .await
            .expect("set");
        assert_eq!(
            store.get(key).await.expect("get"),
            Some(serde_json::json!(["a"]))
        );

        store
            .set(key, &serde_json::json!(["b"]), Duration::from_secs(60))
            .await
            .expect("overwrite");
        assert_eq!(
            store.get(key).await.expect("get"),
            Some(serde_json::json!(["b"]))
        );
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let store = MemoryCacheStore::new();
        store
            .set("k", &serde_json::json!(1), Duration::ZERO)
            .await
            .expect("set");

        assert!(store.get("k").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryCacheStore::new();
        store
            .set("k", &serde_json::json!(1), Duration::from_secs(60))
            .await
            .expect("set");

        store.delete("k").await.expect("delete");
        store.delete("k").await.expect("repeat delete");
        assert!(store.get("k").await.expect("get").is_none());
    }
}
