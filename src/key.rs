use std::fmt;

use crate::error::CacheError;

/// Separator used by the canonical string encoding.
const SEPARATOR: char = '/';

/// Escape character for separator occurrences inside segments.
const ESCAPE: char = '\\';

/// An ordered, non-empty sequence of string segments identifying a cacheable
/// item.
///
/// Keys are hierarchical: earlier segments are coarser-grained (a namespace),
/// later segments more specific. Equality is positional. A key used for
/// invalidation acts as a *prefix* and matches every stored key whose leading
/// segments equal it, position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    /// Build a key from an ordered sequence of segments.
    ///
    /// # Example
    /// ```ignore
    /// let key = CacheKey::new(["users", "42", "posts"]);
    /// ```
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CacheKey(segments.into_iter().map(Into::into).collect())
    }

    /// The ordered segments of this key.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True iff `self` is no longer than `key` and every segment of `self`
    /// equals the segment of `key` at the same position.
    ///
    /// A prefix longer than the key never matches. There is no wildcard or
    /// out-of-order matching.
    pub fn is_prefix_of(&self, key: &CacheKey) -> bool {
        self.0.len() <= key.0.len() && self.0.iter().zip(&key.0).all(|(a, b)| a == b)
    }

    /// Check the key's structural requirements.
    ///
    /// An empty key is malformed. Backend-specific requirements (e.g. a fixed
    /// key width) are checked by the adapter that imposes them.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.0.is_empty() {
            return Err(CacheError::InvalidKey(
                "cache key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical single-string encoding, used for log output and string
    /// indexing.
    ///
    /// Segments are joined with `/`; any `/` or `\` inside a segment is
    /// escaped with `\`, so segment content can never collide with the
    /// separator and segment boundaries stay unambiguous.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            for ch in segment.chars() {
                if ch == SEPARATOR || ch == ESCAPE {
                    out.push(ESCAPE);
                }
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<Vec<String>> for CacheKey {
    fn from(segments: Vec<String>) -> Self {
        CacheKey(segments)
    }
}

impl From<&[&str]> for CacheKey {
    fn from(segments: &[&str]) -> Self {
        CacheKey::new(segments.iter().copied())
    }
}

impl<S: Into<String>> FromIterator<S> for CacheKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        CacheKey::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_positional() {
        assert_eq!(CacheKey::new(["a", "b"]), CacheKey::new(["a", "b"]));
        assert_ne!(CacheKey::new(["a", "b"]), CacheKey::new(["b", "a"]));
        assert_ne!(CacheKey::new(["a", "b"]), CacheKey::new(["a"]));
    }

    #[test]
    fn test_prefix_matches_leading_segments() {
        let prefix = CacheKey::new(["a"]);
        let key = CacheKey::new(["a", "b", "c"]);
        assert!(prefix.is_prefix_of(&key));
    }

    #[test]
    fn test_prefix_mismatch_in_position() {
        let prefix = CacheKey::new(["a", "b"]);
        let key = CacheKey::new(["a", "c"]);
        assert!(!prefix.is_prefix_of(&key));
    }

    #[test]
    fn test_prefix_longer_than_key_never_matches() {
        let prefix = CacheKey::new(["a", "b"]);
        let key = CacheKey::new(["a"]);
        assert!(!prefix.is_prefix_of(&key));
    }

    #[test]
    fn test_key_is_prefix_of_itself() {
        let key = CacheKey::new(["a", "b"]);
        assert!(key.is_prefix_of(&key));
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let key = CacheKey::new(Vec::<String>::new());
        assert!(matches!(key.validate(), Err(CacheError::InvalidKey(_))));
        assert!(CacheKey::new(["a"]).validate().is_ok());
    }

    #[test]
    fn test_encode_preserves_segment_boundaries() {
        // A separator inside a segment must not produce the same encoding as
        // two separate segments.
        let single = CacheKey::new(["a/b"]);
        let split = CacheKey::new(["a", "b"]);
        assert_ne!(single.encode(), split.encode());
        assert_eq!(split.encode(), "a/b");
        assert_eq!(single.encode(), "a\\/b");
    }

    #[test]
    fn test_encode_escapes_escape_char() {
        let key = CacheKey::new(["a\\", "b"]);
        assert_eq!(key.encode(), "a\\\\/b");
    }
}
