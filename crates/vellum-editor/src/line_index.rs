//! Conversion between byte offsets and the text editor's line/column
//! addressing.
//!
//! Lines and columns are 1-based. Columns count UTF-16 code units, the way
//! a browser-hosted editor measures them.

use serde::{Deserialize, Serialize};
use vellum_dom::SourceRange;

/// A position in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// 1-based line number.
    pub line_number: usize,
    /// 1-based column, in UTF-16 code units.
    pub column: usize,
}

/// A range in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRange {
    /// Line of the first character.
    pub start_line_number: usize,
    /// Column of the first character.
    pub start_column: usize,
    /// Line of the end position.
    pub end_line_number: usize,
    /// Column just past the last character.
    pub end_column: usize,
}

impl EditorRange {
    /// The range's start.
    #[must_use]
    pub const fn start(&self) -> Position {
        Position {
            line_number: self.start_line_number,
            column: self.start_column,
        }
    }

    /// The range's end.
    #[must_use]
    pub const fn end(&self) -> Position {
        Position {
            line_number: self.end_line_number,
            column: self.end_column,
        }
    }
}

/// Line start offsets of one text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset where each line begins; the first entry is 0.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index the lines of `text`. Lines end at `\n`; a preceding `\r` is
    /// part of the line it ends.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self { text, line_starts }
    }

    /// Number of lines; an empty text has one.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The editor position of byte `offset`.
    ///
    /// Offsets past the end clamp to the end of the text; an offset inside
    /// a multi-byte character resolves to the start of that character.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.text[line_start..offset].encode_utf16().count() + 1;
        Position {
            line_number: line,
            column,
        }
    }

    /// The editor range covering `range`.
    #[must_use]
    pub fn range(&self, range: SourceRange) -> EditorRange {
        let start = self.position(range.start);
        let end = self.position(range.end);
        EditorRange {
            start_line_number: start.line_number,
            start_column: start.column,
            end_line_number: end.line_number,
            end_column: end.column,
        }
    }

    /// The byte offset of `position`, if it falls inside the text.
    #[must_use]
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line_number.checked_sub(1)?)?;
        let line_end = self
            .line_starts
            .get(position.line_number)
            .map_or(self.text.len(), |&next| next - 1);
        let line = &self.text[line_start..line_end];

        let mut remaining = position.column.checked_sub(1)?;
        for (index, c) in line.char_indices() {
            if remaining == 0 {
                return Some(line_start + index);
            }
            remaining = remaining.checked_sub(c.len_utf16())?;
        }
        (remaining == 0).then_some(line_end)
    }
}
