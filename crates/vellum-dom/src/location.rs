//! Source positions recorded by the parser.
//!
//! All offsets are byte offsets into the source `String` the tree was parsed
//! from, so `&source[range.start..range.end]` is always a valid slice.

use serde::{Deserialize, Serialize};

/// A half-open byte range `start..end` into a source text.
///
/// Invariant: `start <= end`. Ranges built by the parser also satisfy
/// `end <= source.len()` and fall on `char` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    /// Offset of the first byte.
    #[serde(rename = "startOffset")]
    pub start: usize,
    /// Offset one past the last byte.
    #[serde(rename = "endOffset")]
    pub end: usize,
}

impl SourceRange {
    /// Create a range, returning `None` when `end < start`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Option<Self> {
        if end < start {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside `start..end`.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The slice of `source` this range covers, if it is in bounds and on
    /// `char` boundaries.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }

    /// Convert byte offsets into UTF-16 code-unit offsets of `source`.
    ///
    /// Browser text APIs count UTF-16 code units; this is the range as a
    /// script running in the editor page would see it. Offsets past the end
    /// of `source` clamp to its length.
    #[must_use]
    pub fn to_utf16(&self, source: &str) -> Self {
        let start = utf16_offset(source, self.start);
        let end = utf16_offset(source, self.end);
        Self { start, end }
    }
}

/// Number of UTF-16 code units in `source[..byte_offset]`.
///
/// A `byte_offset` inside a multi-byte character counts that character as
/// not yet reached.
#[must_use]
pub fn utf16_offset(source: &str, byte_offset: usize) -> usize {
    source
        .char_indices()
        .take_while(|(index, c)| index + c.len_utf8() <= byte_offset)
        .map(|(_, c)| c.len_utf16())
        .sum()
}

/// Where an element's markup sits in the source text.
///
/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
/// records no positions; this mirrors what position-tracking HTML parsers
/// report (`startTag`, `endTag` and the overall element span).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementLocation {
    /// The opening tag, from `<` through `>`.
    pub start_tag: SourceRange,
    /// The closing tag, when an explicit matching end tag closed the element.
    pub end_tag: Option<SourceRange>,
    /// From the start of the opening tag to the end of the closing tag, or to
    /// the offset where the element was implicitly closed, or to the end of
    /// input.
    pub span: SourceRange,
    /// Whether the opening tag used `/>` syntax.
    pub self_closing: bool,
}

impl ElementLocation {
    /// Location of an element whose opening tag spans `start_tag`; the
    /// element is assumed to extend to the end of the tag until it is closed.
    #[must_use]
    pub const fn opened(start_tag: SourceRange, self_closing: bool) -> Self {
        Self {
            start_tag,
            end_tag: None,
            span: start_tag,
            self_closing,
        }
    }

    /// The content between the opening and closing tags, when both are known.
    #[must_use]
    pub fn inner(&self) -> Option<SourceRange> {
        let end_tag = self.end_tag?;
        SourceRange::new(self.start_tag.end, end_tag.start)
    }
}
