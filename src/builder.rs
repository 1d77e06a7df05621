//! Builder API for coordinators with lifecycle hooks.

use std::sync::Arc;

use crate::adapter::CacheAdapter;
use crate::entry::CacheEntry;
use crate::hooks::{HookContext, Hooks};
use crate::swr::SwrCache;

/// Builder for an [`SwrCache`] with optional lifecycle hooks.
///
/// Each hook is individually optional; any subset may be configured.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use swr_loader::{MemoryAdapter, SwrCache};
///
/// let adapter = Arc::new(MemoryAdapter::new());
/// let cache: SwrCache<String> = SwrCache::builder(adapter)
///     .before_get(|ctx| tracing::debug!("reading key={}", ctx.cache_key))
///     .after_set(|data| tracing::debug!("wrote {} bytes", data.len()))
///     .build();
/// ```
pub struct SwrCacheBuilder<V>
where
    V: Clone + Send + Sync,
{
    adapter: Arc<dyn CacheAdapter<V>>,
    hooks: Hooks<V>,
}

impl<V> SwrCacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new builder over the given adapter.
    pub fn new(adapter: Arc<dyn CacheAdapter<V>>) -> Self {
        SwrCacheBuilder {
            adapter,
            hooks: Hooks::default(),
        }
    }

    /// Observe every cache read, before the adapter is consulted.
    pub fn before_get<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.before_get = Some(Box::new(hook));
        self
    }

    /// Observe the result of every cache read (`None` on a miss).
    pub fn after_get<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&CacheEntry<V>>) + Send + Sync + 'static,
    {
        self.hooks.after_get = Some(Box::new(hook));
        self
    }

    /// Observe the start of every revalidation, before the fetch runs.
    pub fn before_set<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.before_set = Some(Box::new(hook));
        self
    }

    /// Observe every successful revalidation write.
    pub fn after_set<F>(mut self, hook: F) -> Self
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.hooks.after_set = Some(Box::new(hook));
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> SwrCache<V> {
        SwrCache::with_hooks(self.adapter, self.hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryAdapter;
    use crate::key::CacheKey;
    use crate::swr::{ErrorMode, SwrOptions};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_hooks_fire_in_order_around_revalidation() {
        let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let adapter = Arc::new(MemoryAdapter::new());
        let cache: SwrCache<String> = SwrCache::builder(adapter)
            .before_get({
                let events = events.clone();
                move |_ctx| events.lock().unwrap().push("before_get")
            })
            .after_get({
                let events = events.clone();
                move |_entry| events.lock().unwrap().push("after_get")
            })
            .before_set({
                let events = events.clone();
                move |_ctx| events.lock().unwrap().push("before_set")
            })
            .after_set({
                let events = events.clone();
                move |_data| events.lock().unwrap().push("after_set")
            })
            .build();

        let result = cache
            .swr(
                SwrOptions {
                    cache_key: CacheKey::new(["k"]),
                    max_age_ms: 60_000,
                    on_error: ErrorMode::Throw,
                },
                |_key| async move { Ok("value".to_string()) },
            )
            .await
            .unwrap();
        result.fresh.await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["before_get", "after_get", "before_set", "after_set"]
        );
    }

    #[tokio::test]
    async fn test_set_hooks_skipped_on_fast_path() {
        let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let adapter = Arc::new(MemoryAdapter::new());
        let cache: SwrCache<String> = SwrCache::builder(adapter)
            .before_set({
                let events = events.clone();
                move |_ctx| events.lock().unwrap().push("before_set")
            })
            .after_set({
                let events = events.clone();
                move |_data| events.lock().unwrap().push("after_set")
            })
            .build();

        let key = CacheKey::new(["k"]);
        cache.mutate(&key, "value".to_string()).await.unwrap();

        let result = cache
            .swr(
                SwrOptions {
                    cache_key: key,
                    max_age_ms: 60_000,
                    on_error: ErrorMode::Throw,
                },
                |_key| async move { Ok("unused".to_string()) },
            )
            .await
            .unwrap();
        result.fresh.await.unwrap();

        assert!(events.lock().unwrap().is_empty());
    }
}
