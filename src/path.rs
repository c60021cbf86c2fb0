//! Separator-delimited bucket paths.

use std::fmt;

use crate::error::{Error, Result};

/// An ordered list of nested bucket names, outermost first.
///
/// Always holds at least one segment and never an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    raw: String,
    segments: Vec<Vec<u8>>,
}

impl BucketPath {
    /// Splits `raw` on `separator`.
    ///
    /// Fails with [`Error::BucketNameRequired`] if any segment is empty, which
    /// covers the empty string as well as leading, trailing or doubled
    /// separators.
    pub fn parse(raw: &str, separator: &str) -> Result<Self> {
        if separator.is_empty() {
            return Err(Error::Config("separator cannot be empty".to_string()));
        }

        let segments: Vec<Vec<u8>> = raw
            .split(separator)
            .map(|segment| segment.as_bytes().to_vec())
            .collect();

        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::BucketNameRequired);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn first(&self) -> &[u8] {
        &self.segments[0]
    }

    /// Segments after the top-level bucket.
    pub fn rest(&self) -> &[Vec<u8>] {
        &self.segments[1..]
    }
}

impl fmt::Display for BucketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let path = BucketPath::parse("foo", ".").unwrap();
        assert_eq!(path.first(), b"foo");
        assert!(path.rest().is_empty());
    }

    #[test]
    fn test_nested_segments() {
        let path = BucketPath::parse("a.b.c", ".").unwrap();
        assert_eq!(path.first(), b"a");
        assert_eq!(path.rest(), &[b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(path.to_string(), "a.b.c");
    }

    #[test]
    fn test_custom_separator() {
        let path = BucketPath::parse("a::b.c", "::").unwrap();
        assert_eq!(path.first(), b"a");
        assert_eq!(path.rest(), &[b"b.c".to_vec()]);
    }

    #[test]
    fn test_empty_segments_rejected() {
        for raw in ["", ".", "a.", ".a", "a..b"] {
            assert!(
                matches!(BucketPath::parse(raw, "."), Err(Error::BucketNameRequired)),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_separator_rejected() {
        assert!(matches!(BucketPath::parse("abc", ""), Err(Error::Config(_))));
    }
}
