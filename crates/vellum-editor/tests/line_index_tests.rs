//! Tests for byte offset to editor position conversion.

use vellum_dom::SourceRange;
use vellum_editor::{EditorRange, LineIndex, Position};

fn position(line_number: usize, column: usize) -> Position {
    Position {
        line_number,
        column,
    }
}

// ===== Positions =====

#[test]
fn test_single_line() {
    let index = LineIndex::new("hello");
    assert_eq!(index.line_count(), 1);
    assert_eq!(index.position(0), position(1, 1));
    assert_eq!(index.position(5), position(1, 6));
}

#[test]
fn test_multiple_lines() {
    let index = LineIndex::new("ab\ncd\n\nef");
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.position(2), position(1, 3));
    assert_eq!(index.position(3), position(2, 1));
    assert_eq!(index.position(6), position(3, 1));
    assert_eq!(index.position(8), position(4, 2));
}

#[test]
fn test_empty_text() {
    let index = LineIndex::new("");
    assert_eq!(index.line_count(), 1);
    assert_eq!(index.position(0), position(1, 1));
}

#[test]
fn test_trailing_newline_starts_a_line() {
    let index = LineIndex::new("a\n");
    assert_eq!(index.line_count(), 2);
    assert_eq!(index.position(2), position(2, 1));
}

#[test]
fn test_carriage_return_stays_on_its_line() {
    let index = LineIndex::new("a\r\nb");
    assert_eq!(index.position(1), position(1, 2));
    assert_eq!(index.position(3), position(2, 1));
}

#[test]
fn test_columns_count_utf16_units() {
    // é is 2 bytes and 1 unit; 😀 is 4 bytes and 2 units
    let text = "é😀x";
    let index = LineIndex::new(text);
    assert_eq!(index.position(2), position(1, 2));
    assert_eq!(index.position(6), position(1, 4));
    assert_eq!(index.position(7), position(1, 5));
}

#[test]
fn test_offsets_are_clamped_and_floored() {
    let index = LineIndex::new("aé");
    // offset 2 is inside é
    assert_eq!(index.position(2), position(1, 2));
    assert_eq!(index.position(100), position(1, 3));
}

// ===== Ranges =====

#[test]
fn test_range_spanning_lines() {
    let text = "<div>\n  <p class=\"x\">hi</p>\n</div>";
    let index = LineIndex::new(text);
    let p = SourceRange { start: 8, end: 27 };
    assert_eq!(p.slice(text), Some("<p class=\"x\">hi</p>"));
    assert_eq!(
        index.range(p),
        EditorRange {
            start_line_number: 2,
            start_column: 3,
            end_line_number: 2,
            end_column: 22,
        }
    );

    let whole = index.range(SourceRange {
        start: 0,
        end: text.len(),
    });
    assert_eq!(whole.start(), position(1, 1));
    assert_eq!(whole.end(), position(3, 7));
}

#[test]
fn test_range_json_shape() {
    let range = LineIndex::new("ab\ncd").range(SourceRange { start: 1, end: 4 });
    let json = serde_json::to_value(range).expect("serializes");
    assert_eq!(json["startLineNumber"], 1);
    assert_eq!(json["startColumn"], 2);
    assert_eq!(json["endLineNumber"], 2);
    assert_eq!(json["endColumn"], 2);
}

// ===== Offsets =====

#[test]
fn test_offset_of_position() {
    let index = LineIndex::new("ab\ncd");
    assert_eq!(index.offset(position(1, 1)), Some(0));
    assert_eq!(index.offset(position(1, 3)), Some(2));
    assert_eq!(index.offset(position(2, 2)), Some(4));
    assert_eq!(index.offset(position(2, 3)), Some(5));
}

#[test]
fn test_offset_of_position_outside_the_text() {
    let index = LineIndex::new("ab\ncd");
    assert_eq!(index.offset(position(0, 1)), None);
    assert_eq!(index.offset(position(1, 0)), None);
    assert_eq!(index.offset(position(1, 4)), None);
    assert_eq!(index.offset(position(3, 1)), None);
}

#[test]
fn test_offset_inside_a_surrogate_pair() {
    let index = LineIndex::new("😀a");
    assert_eq!(index.offset(position(1, 3)), Some(4));
    assert_eq!(index.offset(position(1, 2)), None);
}

#[test]
fn test_position_and_offset_agree() {
    let text = "one\ntwö\n\nfour 😀 five";
    let index = LineIndex::new(text);
    for (offset, _) in text.char_indices() {
        assert_eq!(index.offset(index.position(offset)), Some(offset));
    }
}
