use async_trait::async_trait;

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::key::CacheKey;

/// The capability set any storage backend must implement.
///
/// An adapter is not a class hierarchy: backends share no code and are
/// selected at construction time via `Arc<dyn CacheAdapter<V>>`. Any backend
/// satisfying this contract is interchangeable, whether it keeps entries in
/// memory, in a local database, or in an external reactive store.
///
/// The adapter owns the locking discipline that makes each operation
/// individually atomic. Concurrent `invalidate`/`set` on overlapping keys may
/// interleave; the only guarantee is that each individual entry's final state
/// reflects one complete operation.
///
/// Any operation may fail with a storage error (e.g. the persistence layer is
/// unavailable). Such errors propagate untranslated to the caller.
#[async_trait]
pub trait CacheAdapter<V>: Send + Sync {
    /// A name for log output.
    ///
    /// # Example
    /// - "memory"
    /// - "sqlite"
    /// - "watch"
    fn name(&self) -> &'static str;

    /// Return the entry stored under exactly `key` (not a prefix match).
    ///
    /// Absence is a normal, representable result: the response must be
    /// `Ok(None)` for a miss, never an error.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry<V>>, CacheError>;

    /// Insert or overwrite the entry for exactly `key`.
    async fn set(&self, key: &CacheKey, entry: CacheEntry<V>) -> Result<(), CacheError>;

    /// Mark every stored entry whose key has `prefix` as a prefix as
    /// invalidated by resetting its `updated_at` to the sentinel, in place.
    ///
    /// Entries are not removed; their payloads stay available for degraded
    /// reads.
    async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError>;

    /// Physically remove every stored entry whose key has `prefix` as a
    /// prefix.
    async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError>;

    /// Physically remove all stored entries, regardless of key.
    async fn reset(&self) -> Result<(), CacheError>;
}
