//! Byte spans into source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Zero-width span at `position`.
    pub fn empty_at(position: usize) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Borrow the text covered by this span, if it lies on char boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
