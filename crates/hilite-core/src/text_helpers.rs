//! Char-offset string helpers.
//!
//! All offsets in this crate count Unicode scalar values, so slicing a
//! `str` always goes through a char-to-byte conversion first.

use smol_str::SmolStr;

/// Length in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of char offset `offset`, clamped to the end of `text`.
pub fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Split at a char offset.
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    text.split_at(char_to_byte(text, offset))
}

/// Insert `insert` at char offset `offset`.
pub fn insert_at_char(text: &str, offset: usize, insert: &str) -> SmolStr {
    let (before, after) = split_at_char(text, offset);
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(before);
    out.push_str(insert);
    out.push_str(after);
    SmolStr::new(out)
}

/// Remove the chars in `range`.
pub fn remove_chars(text: &str, range: std::ops::Range<usize>) -> SmolStr {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end).max(start);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&text[end..]);
    SmolStr::new(out)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `cursor`, for word-wise backspace.
pub fn find_word_boundary_backward(text: &str, cursor: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = cursor.min(chars.len());

    // Gap first, then the word itself.
    while pos > 0 && !is_word_char(chars[pos - 1]) {
        pos -= 1;
    }
    while pos > 0 && is_word_char(chars[pos - 1]) {
        pos -= 1;
    }

    pos
}

/// Where word-wise forward delete stops: past the next word and its trailing gap.
pub fn find_word_boundary_forward(text: &str, cursor: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut pos = cursor.min(len);

    while pos < len && is_word_char(chars[pos]) {
        pos += 1;
    }
    while pos < len && !is_word_char(chars[pos]) {
        pos += 1;
    }

    pos
}
