//! Splitting an editor buffer into SQL statements
//!
//! Quote tracking covers single- and double-quoted runs. A backslash
//! immediately before the closing quote keeps the run open; a doubled quote
//! closes and reopens it, which has the same effect. Offsets are byte offsets
//! into the text.

use std::ops::Range;

/// Byte positions of every `;` outside a quoted run.
fn separator_positions(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut positions = Vec::new();
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q && !(i > 0 && bytes[i - 1] == b'\\') {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b';' => positions.push(i),
                _ => {}
            },
        }
    }
    positions
}

/// Raw statement ranges, one per separator plus the trailing remainder.
fn statement_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for sep in separator_positions(text) {
        ranges.push(start..sep);
        start = sep + 1;
    }
    ranges.push(start..text.len());
    ranges
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace() || c == ';')
}

/// Split `text` into trimmed, non-blank statements.
pub fn split_statements(text: &str) -> Vec<String> {
    statement_ranges(text)
        .into_iter()
        .map(|r| text[r].trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Byte range of the statement the cursor sits in.
///
/// When the cursor is in a blank statement, or only whitespace separates it
/// from the preceding terminator, the nearest preceding non-blank statement
/// is returned instead. At the start of the document there is nothing to fall
/// back to and the blank range is returned as is.
pub fn statement_bounds_at(text: &str, cursor: usize) -> (usize, usize) {
    let cursor = clamp_cursor(text, cursor);
    let ranges = statement_ranges(text);

    let current = ranges
        .iter()
        .position(|r| r.start <= cursor && cursor <= r.end)
        .unwrap_or(ranges.len() - 1);
    let range = &ranges[current];

    let blank = is_blank(&text[range.clone()]);
    let leading_whitespace = current > 0 && text[range.start..cursor].trim().is_empty();

    if blank || leading_whitespace {
        if let Some(prev) = ranges[..current]
            .iter()
            .rev()
            .find(|r| !is_blank(&text[(*r).clone()]))
        {
            return (prev.start, prev.end);
        }
    }
    (range.start, range.end)
}

/// Trimmed text of the statement under the cursor.
pub fn statement_at(text: &str, cursor: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let (start, end) = statement_bounds_at(text, cursor);
    text[start..end].trim().to_string()
}
