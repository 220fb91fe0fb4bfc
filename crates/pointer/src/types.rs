//! Segment and path types.

use std::fmt;
use std::sync::Arc;

use crate::util::{format_pointer, is_integer, split_pointer};

/// Markers that address the position after the last list element.
///
/// `~` is accepted for compatibility with clients predating RFC 6902's `-`.
pub const APPEND_MARKERS: [&str; 2] = ["-", "~"];

/// Lexical classification of a pointer segment.
///
/// This is only the *form* of the token. Whether a segment names a property,
/// indexes a list or keys a map is decided when a path is bound to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Anything that is neither numeric nor an append marker.
    Name,
    /// A non-negative integer literal.
    Number(usize),
    /// `-` (or `~`).
    Append,
}

/// One unescaped pointer segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    raw: String,
    kind: SegmentKind,
}

impl Segment {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = if APPEND_MARKERS.contains(&raw.as_str()) {
            SegmentKind::Append
        } else if is_integer(&raw) {
            // Literals too large for usize stay names.
            raw.parse().map(SegmentKind::Number).unwrap_or(SegmentKind::Name)
        } else {
            SegmentKind::Name
        };
        Self { raw, kind }
    }

    /// The unescaped text, used verbatim as a map key.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn index(&self) -> Option<usize> {
        match self.kind {
            SegmentKind::Number(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_append(&self) -> bool {
        self.kind == SegmentKind::Append
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// An untyped pointer: the source string plus its parsed segments.
///
/// Two paths with equal strings are interchangeable. Use [`Path::of`] to share
/// parsed instances process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pointer: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parses `pointer` without consulting the cache.
    ///
    /// # Example
    ///
    /// ```
    /// use typed_patch_pointer::{Path, SegmentKind};
    ///
    /// let path = Path::parse("/todos/1/items/-");
    /// let kinds: Vec<_> = path.segments().iter().map(|s| s.kind()).collect();
    /// assert_eq!(
    ///     kinds,
    ///     vec![SegmentKind::Name, SegmentKind::Number(1), SegmentKind::Name, SegmentKind::Append]
    /// );
    /// ```
    pub fn parse(pointer: &str) -> Self {
        let segments = split_pointer(pointer).into_iter().map(Segment::new).collect();
        Self {
            pointer: pointer.to_string(),
            segments,
        }
    }

    /// Returns the shared parsed instance for `pointer`.
    pub fn of(pointer: &str) -> Arc<Path> {
        crate::cache::lookup(pointer)
    }

    pub fn root() -> Arc<Path> {
        Self::of("")
    }

    /// The pointer string this path was parsed from.
    pub fn as_str(&self) -> &str {
        &self.pointer
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path addresses the root value.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Whether the final segment is an append marker.
    pub fn is_append(&self) -> bool {
        self.last().is_some_and(Segment::is_append)
    }

    /// The path without its final segment; the root is its own parent.
    pub fn parent(&self) -> Arc<Path> {
        match self.segments.split_last() {
            Some((_, init)) => {
                let raw: Vec<&str> = init.iter().map(Segment::raw).collect();
                Path::of(&format_pointer(&raw))
            }
            None => Path::root(),
        }
    }

    /// Whether `self` is a proper ancestor of `other`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.segments.len() < other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.raw == b.raw)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_segments_lexically() {
        assert_eq!(Segment::new("name").kind(), SegmentKind::Name);
        assert_eq!(Segment::new("12").kind(), SegmentKind::Number(12));
        assert_eq!(Segment::new("-").kind(), SegmentKind::Append);
        assert_eq!(Segment::new("~").kind(), SegmentKind::Append);
        assert_eq!(Segment::new("1.5").kind(), SegmentKind::Name);
        assert_eq!(
            Segment::new("99999999999999999999999999").kind(),
            SegmentKind::Name
        );
    }

    #[test]
    fn keeps_raw_text_of_numeric_segments() {
        let segment = Segment::new("007");
        assert_eq!(segment.raw(), "007");
        assert_eq!(segment.index(), Some(7));
    }

    #[test]
    fn parent_of_nested_path() {
        let path = Path::parse("/a~1b/c/0");
        assert_eq!(path.parent().as_str(), "/a~1b/c");
        assert_eq!(Path::parse("/a").parent().as_str(), "");
        assert!(Path::parse("").parent().is_root());
    }

    #[test]
    fn prefix_relationship() {
        let parent = Path::parse("/foo");
        let child = Path::parse("/foo/bar");
        assert!(parent.is_prefix_of(&child));
        assert!(!child.is_prefix_of(&parent));
        assert!(!parent.is_prefix_of(&parent));
    }

    #[test]
    fn append_detection() {
        assert!(Path::parse("/items/-").is_append());
        assert!(!Path::parse("/items/0").is_append());
        assert!(!Path::parse("").is_append());
    }
}
