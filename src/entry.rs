use serde::{Deserialize, Serialize};

/// Reserved `updated_at` value meaning "explicitly invalidated".
///
/// An entry carrying this timestamp is treated as infinitely stale regardless
/// of max-age, while its payload stays available for degraded reads.
pub const INVALIDATED_AT: i64 = 0;

/// A cache entry: a value and the time it was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub data: V,

    /// Unix timestamp in milliseconds of the last successful write.
    /// `0` is the invalidation sentinel, see [`INVALIDATED_AT`].
    pub updated_at: i64,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry.
    pub fn new(data: V, updated_at: i64) -> Self {
        CacheEntry { data, updated_at }
    }

    /// True if the entry was explicitly invalidated.
    pub fn is_invalidated(&self) -> bool {
        self.updated_at == INVALIDATED_AT
    }

    /// Age of the entry in milliseconds at time `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.updated_at
    }

    /// Whether the entry must be revalidated at time `now_ms` under the given
    /// max-age.
    ///
    /// The comparison is strict: an entry exactly `max_age_ms` old is still
    /// fresh. An invalidated entry always revalidates.
    pub fn needs_revalidation(&self, now_ms: i64, max_age_ms: i64) -> bool {
        self.is_invalidated() || self.age_ms(now_ms) > max_age_ms
    }

    /// Convert into a caller-facing snapshot with the given status tag.
    pub fn into_snapshot(self, status: Status) -> Snapshot<V> {
        Snapshot {
            data: self.data,
            updated_at: self.updated_at,
            status,
        }
    }
}

/// Where the data in a [`Snapshot`] came from.
///
/// The variants are mutually exclusive and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Freshly fetched from the origin.
    Fresh,
    /// Reused from the cache; no fetch was needed.
    Cached,
    /// Reused from the cache after a failed fetch.
    Stale,
}

/// A point-in-time view of a cache entry, tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    pub data: V,
    pub updated_at: i64,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_exactly_max_age_old_is_still_fresh() {
        let entry = CacheEntry::new("value", 1_000);
        // age == max_age: no revalidation
        assert!(!entry.needs_revalidation(1_000 + 60_000, 60_000));
        // age == max_age + 1: revalidation
        assert!(entry.needs_revalidation(1_000 + 60_001, 60_000));
    }

    #[test]
    fn test_invalidated_entry_always_revalidates() {
        let entry = CacheEntry::new("value", INVALIDATED_AT);
        assert!(entry.is_invalidated());
        assert!(entry.needs_revalidation(1, i64::MAX));
    }

    #[test]
    fn test_snapshot_carries_entry_fields() {
        let entry = CacheEntry::new("value", 42);
        let snapshot = entry.into_snapshot(Status::Cached);
        assert_eq!(snapshot.data, "value");
        assert_eq!(snapshot.updated_at, 42);
        assert_eq!(snapshot.status, Status::Cached);
    }
}
