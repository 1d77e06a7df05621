//! swr-loader - A stale-while-revalidate (SWR) caching layer for Rust
//!
//! This library sits between a data consumer and a slow or unreliable data
//! source. Per request it decides whether to serve cached data, refresh it in
//! the background, or block on a fresh fetch:
//! - Hierarchical cache keys with prefix-based invalidation
//! - Pluggable storage adapters (in-memory, SQLite, Moka, reactive watch
//!   store)
//! - Configurable degrade-to-stale error handling
//! - Optional lifecycle hooks for instrumentation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use swr_loader::{CacheKey, ErrorMode, MemoryAdapter, SwrCache, SwrOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = Arc::new(MemoryAdapter::new());
//!     let cache: SwrCache<String> = SwrCache::new(adapter);
//!
//!     let result = cache
//!         .swr(
//!             SwrOptions {
//!                 cache_key: CacheKey::new(["users", "42"]),
//!                 max_age_ms: 60_000,
//!                 on_error: ErrorMode::ServeStale,
//!             },
//!             |key| async move {
//!                 // Load from the origin - `key` is ["users", "42"]
//!                 Ok(format!("User data for {}", key))
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     // Render immediately from `result.cached` (if present), then await
//!     // the fresh side and re-render with its resolved status.
//!     if let Some(snapshot) = &result.cached {
//!         println!("cached: {}", snapshot.data);
//!     }
//!     let fresh = result.fresh.await.unwrap();
//! }
//! ```

mod adapter;
pub mod adapters;
mod builder;
mod entry;
mod error;
mod hooks;
mod key;
mod swr;
mod utils;

// Re-export public API
pub use adapter::CacheAdapter;
pub use adapters::memory::MemoryAdapter;
pub use adapters::moka::{MokaAdapter, MokaAdapterConfig};
pub use adapters::sqlite::{SqliteAdapter, SqliteAdapterConfig};
pub use adapters::watch::{WatchAdapter, WatchEntry, WatchState};
pub use builder::SwrCacheBuilder;
pub use entry::{CacheEntry, Snapshot, Status, INVALIDATED_AT};
pub use error::{BoxError, CacheError};
pub use hooks::{HookContext, Hooks};
pub use key::CacheKey;
pub use swr::{ErrorMode, Fresh, FreshOutcome, SwrCache, SwrOptions, SwrResult};
