//! Byte-offset spans into a type-spec string.

use std::fmt;
use std::ops::Range;

/// A half-open byte range `[start, end)` into the source text of a type
/// spec. Spans are small because type specs are single-line strings; `u32`
/// offsets keep tokens and errors compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// A zero-width span at a single offset.
    pub fn point(at: u32) -> Self {
        Self { start: at, end: at }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered text of `source`.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds or not on UTF-8 boundaries.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start as usize..self.end as usize]
    }

    /// Convert to a `Range<usize>` for interop with ariadne labels.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
