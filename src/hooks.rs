//! Optional observer callbacks around cache reads and writes.

use crate::entry::CacheEntry;
use crate::key::CacheKey;
use crate::swr::ErrorMode;

/// Snapshot of the call options handed to the `before_*` hooks.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub cache_key: &'a CacheKey,
    pub max_age_ms: i64,
    pub on_error: ErrorMode,
}

type BeforeHook = Box<dyn Fn(&HookContext<'_>) + Send + Sync>;

/// Observer callbacks invoked synchronously around cache reads and writes.
///
/// Each hook is individually optional and configured once at construction
/// (see [`SwrCacheBuilder`](crate::SwrCacheBuilder)). Hooks are pure
/// side-channel observation: they cannot alter the coordinator's decisions,
/// and their panics are not caught.
///
/// `before_get`/`after_get` bracket the adapter read at the start of every
/// `swr` call. `before_set` fires at the head of the revalidation branch,
/// before the fetch; `after_set` fires after a successful write with the
/// fetched value.
pub struct Hooks<V> {
    pub before_get: Option<BeforeHook>,
    pub after_get: Option<Box<dyn Fn(Option<&CacheEntry<V>>) + Send + Sync>>,
    pub before_set: Option<BeforeHook>,
    pub after_set: Option<Box<dyn Fn(&V) + Send + Sync>>,
}

impl<V> Default for Hooks<V> {
    fn default() -> Self {
        Hooks {
            before_get: None,
            after_get: None,
            before_set: None,
            after_set: None,
        }
    }
}
