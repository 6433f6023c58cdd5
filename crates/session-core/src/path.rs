//! Session path parsing.
//!
//! Session paths are dot-separated strings like "profile.address.city".
//! A path with a single segment is *flat* and addresses a key of the root
//! mapping directly; a path with two or more segments is *nested*.
//!
//! Segments are opaque: there is no escaping, trimming or validation, so
//! `"a..b"` has an empty middle segment and `""` is a flat path whose only
//! segment is the empty key.

/// Separator between path segments.
pub const DELIMITER: char = '.';

/// Returns true if the path contains at least one delimiter.
pub fn is_nested(path: &str) -> bool {
    path.contains(DELIMITER)
}

/// Split a path into its ordered segments, root to leaf.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(DELIMITER).map(String::from).collect()
}

/// A parsed session path.
///
/// Parsed once per operation and reused for every step of the walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionPath {
    /// The original path string
    raw: String,
    /// Path segments split by '.'
    segments: Vec<String>,
}

impl SessionPath {
    /// Parse a path string into segments.
    pub fn new(path: &str) -> Self {
        Self {
            raw: path.to_string(),
            segments: split_path(path),
        }
    }

    /// Get the raw path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Get the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for multi-segment paths.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// All segments except the last one.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The final segment.
    pub fn leaf(&self) -> &str {
        // split() always yields at least one item
        &self.segments[self.segments.len() - 1]
    }

    /// Dot-joined prefix made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join(".")
    }
}

impl std::fmt::Display for SessionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for SessionPath {
    fn from(s: &str) -> Self {
        SessionPath::new(s)
    }
}

impl From<String> for SessionPath {
    fn from(s: String) -> Self {
        Self {
            segments: split_path(&s),
            raw: s,
        }
    }
}
