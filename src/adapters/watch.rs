use async_trait::async_trait;
use tokio::sync::watch;

use crate::adapter::CacheAdapter;
use crate::entry::{CacheEntry, INVALIDATED_AT};
use crate::error::CacheError;
use crate::key::CacheKey;

/// One row of the reactive store's state.
#[derive(Debug, Clone)]
pub struct WatchEntry<V> {
    pub key: CacheKey,
    pub entry: CacheEntry<V>,
}

/// The full cache state held by the watch channel.
pub type WatchState<V> = Vec<WatchEntry<V>>;

/// Adapter backed by an external reactive state store, modeled as a
/// `tokio::sync::watch` channel.
///
/// The whole cache state lives in the channel as a list of key/entry rows
/// looked up by positional key equality. Every mutation publishes the new
/// state, so external observers obtained through [`subscribe`] see each
/// cache write as it happens.
///
/// The adapter is constructed from a store-construction function, keeping
/// ownership of the channel with the caller:
///
/// ```ignore
/// use tokio::sync::watch;
/// use swr_loader::WatchAdapter;
///
/// let adapter: WatchAdapter<String> =
///     WatchAdapter::new(|| watch::channel(Vec::new()).0);
/// let mut updates = adapter.subscribe();
/// ```
///
/// [`subscribe`]: WatchAdapter::subscribe
pub struct WatchAdapter<V> {
    tx: watch::Sender<WatchState<V>>,
}

impl<V> WatchAdapter<V>
where
    V: Clone + Send + Sync,
{
    /// Create a new adapter from a store-construction function.
    pub fn new<F>(make_store: F) -> Self
    where
        F: FnOnce() -> watch::Sender<WatchState<V>>,
    {
        WatchAdapter { tx: make_store() }
    }

    /// Subscribe to state changes.
    ///
    /// The receiver is notified on every `set`, `invalidate`, `clear` and
    /// `reset`.
    pub fn subscribe(&self) -> watch::Receiver<WatchState<V>> {
        self.tx.subscribe()
    }
}

impl<V> Default for WatchAdapter<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(|| watch::channel(Vec::new()).0)
    }
}

#[async_trait]
impl<V> CacheAdapter<V> for WatchAdapter<V>
where
    V: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        "watch"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry<V>>, CacheError> {
        let state = self.tx.borrow();
        Ok(state
            .iter()
            .find(|row| row.key == *key)
            .map(|row| row.entry.clone()))
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry<V>) -> Result<(), CacheError> {
        self.tx.send_modify(|state| {
            match state.iter().position(|row| row.key == *key) {
                Some(i) => state[i].entry = entry,
                None => state.push(WatchEntry {
                    key: key.clone(),
                    entry,
                }),
            }
        });
        Ok(())
    }

    async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        self.tx.send_modify(|state| {
            for row in state.iter_mut() {
                if prefix.is_prefix_of(&row.key) {
                    row.entry.updated_at = INVALIDATED_AT;
                }
            }
        });
        Ok(())
    }

    async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        self.tx
            .send_modify(|state| state.retain(|row| !prefix.is_prefix_of(&row.key)));
        Ok(())
    }

    async fn reset(&self) -> Result<(), CacheError> {
        self.tx.send_modify(|state| state.clear());
        Ok(())
    }
}
