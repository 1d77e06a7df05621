use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::adapter::CacheAdapter;
use crate::entry::{CacheEntry, INVALIDATED_AT};
use crate::error::CacheError;
use crate::key::CacheKey;

/// Configuration for MokaAdapter.
#[derive(Debug, Clone)]
pub struct MokaAdapterConfig {
    /// Maximum number of entries the cache can hold.
    pub max_capacity: u64,

    /// Time to live: entries are evicted after this duration from insertion.
    /// `None` means entries never expire based on time (only by size limit).
    pub time_to_live: Option<Duration>,

    /// Time to idle: entries are evicted if not accessed within this
    /// duration. `None` means entries don't expire based on idle time.
    pub time_to_idle: Option<Duration>,
}

impl Default for MokaAdapterConfig {
    fn default() -> Self {
        MokaAdapterConfig {
            max_capacity: 10_000,
            time_to_live: None,
            time_to_idle: None,
        }
    }
}

/// High-performance concurrent in-memory adapter using Moka.
///
/// Provides lock-free concurrent access and predictable performance under
/// high concurrency (>8 threads) for large cache sizes.
///
/// Unlike [`MemoryAdapter`], the backing cache is bounded: entries may also
/// disappear through Moka's capacity and TTL eviction, not only through
/// `clear`/`reset`. Keep `time_to_live`/`time_to_idle` unset if invalidated
/// payloads must stay available for degraded reads.
///
/// [`MemoryAdapter`]: crate::adapters::memory::MemoryAdapter
pub struct MokaAdapter<V>
where
    V: Clone + Send + Sync,
{
    cache: Cache<CacheKey, CacheEntry<V>>,
}

impl<V> MokaAdapter<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new MokaAdapter with the given configuration.
    ///
    /// # Example
    /// ```ignore
    /// let adapter = MokaAdapter::new(MokaAdapterConfig {
    ///     max_capacity: 10_000,
    ///     time_to_live: None,
    ///     time_to_idle: None,
    /// });
    /// ```
    pub fn new(config: MokaAdapterConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        MokaAdapter {
            cache: builder.build(),
        }
    }

    /// Get cache statistics (for monitoring/debugging).
    pub fn stats(&self) -> (u64, u64) {
        let entry_count = self.cache.entry_count();
        let weighted_size = self.cache.weighted_size();
        (entry_count, weighted_size)
    }
}

#[async_trait]
impl<V> CacheAdapter<V> for MokaAdapter<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "moka"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry<V>>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry<V>) -> Result<(), CacheError> {
        self.cache.insert(key.clone(), entry).await;
        Ok(())
    }

    async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        // Moka has no in-place update; re-insert matching entries with the
        // sentinel timestamp.
        let matching: Vec<(CacheKey, CacheEntry<V>)> = self
            .cache
            .iter()
            .filter(|(key, _)| prefix.is_prefix_of(key.as_ref()))
            .map(|(key, entry)| (key.as_ref().clone(), entry))
            .collect();

        for (key, mut entry) in matching {
            entry.updated_at = INVALIDATED_AT;
            self.cache.insert(key, entry).await;
        }
        Ok(())
    }

    async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        let matching: Vec<CacheKey> = self
            .cache
            .iter()
            .filter(|(key, _)| prefix.is_prefix_of(key.as_ref()))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in matching {
            self.cache.invalidate(&key).await;
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), CacheError> {
        self.cache.invalidate_all();
        Ok(())
    }
}
