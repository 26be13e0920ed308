//! Built-in "word at position" lookup, used when the host editor does not
//! supply its own. A word is a maximal run of characters that are neither
//! whitespace nor one of the common punctuation separators.

use std::ops::Range;

const SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !SEPARATORS.contains(c)
}

/// Range of the word touching `offset`, including a word that ends exactly at
/// `offset`. Offsets inside a multi-byte character snap back to its start.
pub fn word_range_at(text: &str, offset: usize) -> Option<Range<usize>> {
    if offset > text.len() {
        return None;
    }
    let mut offset = offset;
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let start = text[..offset]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map_or(offset, |(i, _)| i);
    let end = text[offset..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(text.len(), |(i, _)| offset + i);

    (start < end).then_some(start..end)
}
