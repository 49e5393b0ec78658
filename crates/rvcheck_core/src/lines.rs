//! Line splitting shared by captured output and golden references.
//!
//! Both sides use the same boundaries: `\n`, `\r\n` and a lone `\r`. A terminator at the very end does not
//! start a new (empty) line, so `b"4\n6\n"` is two lines and `b"4\n6\n\n"` is three.

use std::ops::Range;

/// Byte ranges of each line in `bytes`, terminators excluded.
fn line_ranges(bytes: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                ranges.push(start..i);
                i += 1;
                start = i;
            }
            b'\r' => {
                ranges.push(start..i);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        ranges.push(start..bytes.len());
    }
    ranges
}

/// Split raw process output into lines without decoding.
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    line_ranges(bytes).into_iter().map(|r| &bytes[r]).collect()
}

/// Split text into lines. Terminators are ASCII, so every boundary is a char boundary.
pub fn split_text_lines(text: &str) -> Vec<&str> {
    line_ranges(text.as_bytes()).into_iter().map(|r| &text[r]).collect()
}
