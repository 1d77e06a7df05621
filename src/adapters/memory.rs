use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::adapter::CacheAdapter;
use crate::entry::{CacheEntry, INVALIDATED_AT};
use crate::error::CacheError;
use crate::key::CacheKey;

/// Thread-safe in-memory adapter using HashMap with RwLock.
///
/// Takes no construction parameters. Entries are never expired or evicted
/// automatically; they are only removed by `clear` and `reset`, so
/// invalidated payloads stay available for degraded reads.
///
/// Suitable for low to moderate concurrency and small to medium cache sizes.
/// For high-concurrency workloads, consider [`MokaAdapter`] instead.
///
/// [`MokaAdapter`]: crate::adapters::moka::MokaAdapter
pub struct MemoryAdapter<V>
where
    V: Clone + Send + Sync,
{
    state: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V> MemoryAdapter<V>
where
    V: Clone + Send + Sync,
{
    /// Create a new, empty adapter.
    pub fn new() -> Self {
        MemoryAdapter {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored (for monitoring/debugging).
    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }
}

impl<V> Default for MemoryAdapter<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> CacheAdapter<V> for MemoryAdapter<V>
where
    V: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry<V>>, CacheError> {
        let state = self.state.read().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry<V>) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.insert(key.clone(), entry);
        Ok(())
    }

    async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        for (key, entry) in state.iter_mut() {
            if prefix.is_prefix_of(key) {
                entry.updated_at = INVALIDATED_AT;
            }
        }
        Ok(())
    }

    async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.retain(|key, _| !prefix.is_prefix_of(key));
        Ok(())
    }

    async fn reset(&self) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_ms;

    #[tokio::test]
    async fn test_get_set_exact_match() {
        let adapter: MemoryAdapter<String> = MemoryAdapter::new();
        let key = CacheKey::new(["users", "1"]);

        assert!(adapter.get(&key).await.unwrap().is_none());

        let now = now_ms();
        adapter
            .set(&key, CacheEntry::new("value1".to_string(), now))
            .await
            .unwrap();

        let entry = adapter.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.data, "value1");
        assert_eq!(entry.updated_at, now);

        // get is an exact match, not a prefix match
        let prefix = CacheKey::new(["users"]);
        assert!(adapter.get(&prefix).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_marks_prefix_and_keeps_payload() {
        let adapter: MemoryAdapter<String> = MemoryAdapter::new();
        let now = now_ms();

        let posts_1 = CacheKey::new(["posts", "1"]);
        let posts_2 = CacheKey::new(["posts", "2"]);
        let users_1 = CacheKey::new(["users", "1"]);
        for key in [&posts_1, &posts_2, &users_1] {
            adapter
                .set(key, CacheEntry::new("data".to_string(), now))
                .await
                .unwrap();
        }

        adapter.invalidate(&CacheKey::new(["posts"])).await.unwrap();

        // Matching entries are sentinel-marked, payload intact
        for key in [&posts_1, &posts_2] {
            let entry = adapter.get(key).await.unwrap().unwrap();
            assert!(entry.is_invalidated());
            assert_eq!(entry.data, "data");
        }

        // Entries under other prefixes are untouched
        let entry = adapter.get(&users_1).await.unwrap().unwrap();
        assert_eq!(entry.updated_at, now);
    }

    #[tokio::test]
    async fn test_clear_removes_prefix_only() {
        let adapter: MemoryAdapter<String> = MemoryAdapter::new();
        let now = now_ms();

        let posts_1 = CacheKey::new(["posts", "1"]);
        let users_1 = CacheKey::new(["users", "1"]);
        for key in [&posts_1, &users_1] {
            adapter
                .set(key, CacheEntry::new("data".to_string(), now))
                .await
                .unwrap();
        }

        adapter.clear(&CacheKey::new(["posts"])).await.unwrap();

        assert!(adapter.get(&posts_1).await.unwrap().is_none());
        assert!(adapter.get(&users_1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reset_removes_everything() {
        let adapter: MemoryAdapter<String> = MemoryAdapter::new();
        let now = now_ms();

        let a = CacheKey::new(["a"]);
        let b = CacheKey::new(["b", "c"]);
        for key in [&a, &b] {
            adapter
                .set(key, CacheEntry::new("data".to_string(), now))
                .await
                .unwrap();
        }

        adapter.reset().await.unwrap();

        assert!(adapter.get(&a).await.unwrap().is_none());
        assert!(adapter.get(&b).await.unwrap().is_none());
        assert!(adapter.is_empty().await);
    }
}
