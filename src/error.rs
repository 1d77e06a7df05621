/// Boxed error type produced by fetch functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A storage backend operation failed.
    #[error("[{adapter}] storage error for key '{key}': {message}")]
    Storage {
        adapter: String,
        key: String,
        message: String,
    },
    /// The supplied cache key is structurally invalid for the operation
    /// or backend it was handed to.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The fetch function failed during revalidation. The original error is
    /// kept whole and exposed through `source()`.
    #[error("fetch failed: {0}")]
    Fetch(#[source] BoxError),
}

impl CacheError {
    /// Create a new storage error.
    pub fn storage(
        adapter: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Storage {
            adapter: adapter.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a fetch failure (as opposed to a storage or
    /// key error).
    pub fn is_fetch(&self) -> bool {
        matches!(self, CacheError::Fetch(_))
    }
}
