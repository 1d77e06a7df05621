use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::adapter::CacheAdapter;
use crate::entry::{CacheEntry, Snapshot, Status};
use crate::error::{BoxError, CacheError};
use crate::hooks::{HookContext, Hooks};
use crate::key::CacheKey;
use crate::utils::now_ms;

/// What to do when the fetch function fails during revalidation.
///
/// This only governs fetch failures. Storage errors always propagate to the
/// caller, in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Fail the `fresh` computation with the original fetch error.
    Throw,
    /// Resolve the `fresh` computation with the last known entry tagged
    /// [`Status::Stale`], or with `None` if nothing was cached.
    ServeStale,
}

/// Per-call options for [`SwrCache::swr`].
#[derive(Debug, Clone)]
pub struct SwrOptions {
    pub cache_key: CacheKey,
    /// Time in milliseconds after which a cached entry must be revalidated.
    /// An entry exactly this old is still fresh.
    pub max_age_ms: i64,
    pub on_error: ErrorMode,
}

/// What the pending side of an SWR call resolves to.
///
/// - `Ok(Some(_))` tagged [`Status::Fresh`] (freshly fetched),
///   [`Status::Cached`] (cache was still valid, no fetch performed) or
///   [`Status::Stale`] (fetch failed, serving the last known entry).
/// - `Ok(None)`: fetch failed under [`ErrorMode::ServeStale`] and no entry
///   existed to fall back on.
/// - `Err(_)`: the fetch failed under [`ErrorMode::Throw`], or the
///   revalidation write failed.
pub type FreshOutcome<V> = Result<Option<Snapshot<V>>, CacheError>;

enum FreshState<V> {
    /// No revalidation was needed; the outcome is already known.
    Settled(Option<FreshOutcome<V>>),
    /// A revalidation task is running in the background.
    Revalidating(JoinHandle<FreshOutcome<V>>),
}

/// The pending side of an SWR call.
///
/// Resolves exactly once. Dropping it detaches the background revalidation
/// without cancelling it: a cache write that has started always completes.
pub struct Fresh<V> {
    state: FreshState<V>,
}

impl<V> Fresh<V> {
    fn settled(outcome: FreshOutcome<V>) -> Self {
        Fresh {
            state: FreshState::Settled(Some(outcome)),
        }
    }

    fn revalidating(handle: JoinHandle<FreshOutcome<V>>) -> Self {
        Fresh {
            state: FreshState::Revalidating(handle),
        }
    }
}

// Fields are only ever moved out of or polled through Pin::new; V is never
// structurally pinned.
impl<V> Unpin for Fresh<V> {}

impl<V> Future for Fresh<V> {
    type Output = FreshOutcome<V>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            FreshState::Settled(outcome) => {
                let outcome = outcome.take().expect("Fresh polled after completion");
                Poll::Ready(outcome)
            }
            FreshState::Revalidating(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(join_err)) => {
                    if join_err.is_panic() {
                        std::panic::resume_unwind(join_err.into_panic());
                    }
                    unreachable!("revalidation tasks are never aborted")
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// The caller-facing value of an SWR call.
pub struct SwrResult<V> {
    /// Snapshot of the matching entry as it existed at the time of the call,
    /// tagged [`Status::Cached`], or `None` if no entry existed.
    pub cached: Option<Snapshot<V>>,

    /// The pending revalidation outcome; see [`FreshOutcome`].
    pub fresh: Fresh<V>,

    /// The configured error behaviour, carried through so the consuming
    /// layer knows how to interpret a failure of `fresh`.
    pub error_mode: ErrorMode,
}

/// Stale-while-revalidate coordinator.
///
/// Given a cache key, a max-age, a fetch function and an error mode, `swr`
/// returns the cached value (if any) immediately plus a lazily-resolving
/// fresh result. The coordinator decides whether revalidation is needed and,
/// on fetch failure, applies the configured error behaviour.
///
/// The storage backend is pluggable; see [`CacheAdapter`].
pub struct SwrCache<V>
where
    V: Clone + Send + Sync,
{
    adapter: Arc<dyn CacheAdapter<V>>,
    hooks: Arc<Hooks<V>>,
}

impl<V> Clone for SwrCache<V>
where
    V: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        SwrCache {
            adapter: Arc::clone(&self.adapter),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<V> SwrCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new coordinator over the given adapter, with no hooks.
    pub fn new(adapter: Arc<dyn CacheAdapter<V>>) -> Self {
        Self::with_hooks(adapter, Hooks::default())
    }

    /// Create a builder for a coordinator with lifecycle hooks.
    pub fn builder(adapter: Arc<dyn CacheAdapter<V>>) -> crate::builder::SwrCacheBuilder<V> {
        crate::builder::SwrCacheBuilder::new(adapter)
    }

    pub(crate) fn with_hooks(adapter: Arc<dyn CacheAdapter<V>>, hooks: Hooks<V>) -> Self {
        SwrCache {
            adapter,
            hooks: Arc::new(hooks),
        }
    }

    /// Stale-while-revalidate: return the cached value immediately plus a
    /// pending fresh result.
    ///
    /// The returned [`SwrResult`] carries a snapshot of the entry as it
    /// existed at call time (`cached`) and a pending computation (`fresh`)
    /// that either short-circuits (cache still fresh, so no fetch and no write)
    /// or fetches, writes the result back through the adapter, and resolves
    /// with the outcome. On fetch failure the configured [`ErrorMode`]
    /// decides between failing and degrading to stale data.
    ///
    /// Adapter errors on the initial read fail this call directly; they are
    /// not subject to the error mode. Concurrent calls for the same key are
    /// not deduplicated: each independently decides revalidation and may
    /// independently fetch and write.
    ///
    /// # Arguments
    /// * `options` - Cache key, max-age and error behaviour for this call
    /// * `fetch_fn` - Function to load the value from the origin (receives
    ///   the cache key)
    pub async fn swr<F, Fut>(
        &self,
        options: SwrOptions,
        fetch_fn: F,
    ) -> Result<SwrResult<V>, CacheError>
    where
        F: FnOnce(CacheKey) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, BoxError>> + Send + 'static,
    {
        options.cache_key.validate()?;

        if let Some(hook) = &self.hooks.before_get {
            hook(&HookContext {
                cache_key: &options.cache_key,
                max_age_ms: options.max_age_ms,
                on_error: options.on_error,
            });
        }

        let existing = self.adapter.get(&options.cache_key).await?;

        if let Some(hook) = &self.hooks.after_get {
            hook(existing.as_ref());
        }

        let cached = existing
            .clone()
            .map(|entry| entry.into_snapshot(Status::Cached));

        let now = now_ms();
        let SwrOptions {
            cache_key,
            max_age_ms,
            on_error,
        } = options;

        let fresh = match existing {
            Some(entry) if !entry.needs_revalidation(now, max_age_ms) => {
                debug!(
                    "cache still fresh, skipping revalidation: key={}, age_ms={}",
                    cache_key,
                    entry.age_ms(now)
                );
                Fresh::settled(Ok(Some(entry.into_snapshot(Status::Cached))))
            }
            existing => {
                let adapter = Arc::clone(&self.adapter);
                let hooks = Arc::clone(&self.hooks);

                let handle = tokio::spawn(async move {
                    if let Some(hook) = &hooks.before_set {
                        hook(&HookContext {
                            cache_key: &cache_key,
                            max_age_ms,
                            on_error,
                        });
                    }

                    match fetch_fn(cache_key.clone()).await {
                        Ok(data) => {
                            let entry = CacheEntry::new(data, now_ms());
                            adapter.set(&cache_key, entry.clone()).await?;
                            if let Some(hook) = &hooks.after_set {
                                hook(&entry.data);
                            }
                            Ok(Some(entry.into_snapshot(Status::Fresh)))
                        }
                        Err(err) => match on_error {
                            ErrorMode::Throw => Err(CacheError::Fetch(err)),
                            ErrorMode::ServeStale => {
                                debug!(
                                    "fetch failed, degrading to stale: key={}, had_entry={}",
                                    cache_key,
                                    existing.is_some()
                                );
                                Ok(existing.map(|entry| entry.into_snapshot(Status::Stale)))
                            }
                        },
                    }
                });

                Fresh::revalidating(handle)
            }
        };

        Ok(SwrResult {
            cached,
            fresh,
            error_mode: on_error,
        })
    }

    /// Directly overwrite the entry for `cache_key` with `data`, stamped
    /// with the current time.
    ///
    /// Bypasses the fetch path entirely and does not read or compare against
    /// any existing entry. Used for optimistic local updates.
    pub async fn mutate(&self, cache_key: &CacheKey, data: V) -> Result<(), CacheError> {
        cache_key.validate()?;
        self.adapter
            .set(cache_key, CacheEntry::new(data, now_ms()))
            .await
    }

    /// Mark every entry under `prefix` as invalidated.
    ///
    /// Pass-through to [`CacheAdapter::invalidate`]: payloads are kept and
    /// stay available for degraded reads, but any later `swr` call on a
    /// matching key revalidates regardless of max-age.
    pub async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        prefix.validate()?;
        self.adapter.invalidate(prefix).await
    }

    /// Physically remove every entry under `prefix`.
    pub async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        prefix.validate()?;
        self.adapter.clear(prefix).await
    }

    /// Physically remove all entries from the backing store.
    pub async fn reset(&self) -> Result<(), CacheError> {
        self.adapter.reset().await
    }
}
