//! Span classification: decides whether a document offset sits inside a
//! comment-like region or an identifier-like word, and extracts the text to
//! translate from it.
//!
//! Offsets are byte offsets into UTF-8 document text.

pub mod normalize;
pub mod word;

use std::ops::Range;

use regex::Regex;
use serde::Serialize;

pub use normalize::extract_english_from_comment;
pub use word::word_range_at;

/// Matched left to right, first alternative wins at each position:
/// `"""…"""`, `'''…'''`, `#…`, `//…`, `/*…*/`.
const COMMENT_PATTERN: &str =
    r#""""[\s\S]*?"""|'''[\s\S]*?'''|#[^\n]*|//[^\n]*|/\*[\s\S]*?\*/"#;

/// Shortest word that is considered an identifier worth translating.
pub const MIN_IDENTIFIER_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Comment,
    Identifier,
}

/// A classified region of the document. Built per query, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatableSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
    pub raw_text: String,
}

impl TranslatableSpan {
    /// Text handed to the translator: comment delimiters stripped for
    /// comments, the word itself for identifiers.
    pub fn normalized_text(&self) -> String {
        match self.kind {
            SpanKind::Comment => extract_english_from_comment(&self.raw_text),
            SpanKind::Identifier => self.raw_text.clone(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

pub struct SpanClassifier {
    comments: Regex,
}

impl SpanClassifier {
    pub fn new() -> Self {
        Self {
            comments: Regex::new(COMMENT_PATTERN).expect("comment pattern is a valid regex"),
        }
    }

    /// Classify `offset` using the built-in word lookup for the identifier
    /// fallback.
    pub fn classify(&self, document: &str, offset: usize) -> Option<TranslatableSpan> {
        self.classify_with(document, offset, word_range_at)
    }

    /// Classify `offset`, asking `word_at` for the word under the cursor when
    /// no comment contains it. Comments always take priority.
    pub fn classify_with<F>(
        &self,
        document: &str,
        offset: usize,
        word_at: F,
    ) -> Option<TranslatableSpan>
    where
        F: FnOnce(&str, usize) -> Option<Range<usize>>,
    {
        if let Some(range) = self.comment_range_at(document, offset) {
            return Some(TranslatableSpan {
                start: range.start,
                end: range.end,
                kind: SpanKind::Comment,
                raw_text: document[range].to_string(),
            });
        }

        let range = word_at(document, offset)?;
        let word = document.get(range.clone())?;
        if !is_identifier(word) {
            return None;
        }
        Some(TranslatableSpan {
            start: range.start,
            end: range.end,
            kind: SpanKind::Identifier,
            raw_text: word.to_string(),
        })
    }

    /// First comment match whose `[start, end]` contains `offset`. The end
    /// bound is inclusive.
    pub fn comment_range_at(&self, document: &str, offset: usize) -> Option<Range<usize>> {
        self.comments
            .find_iter(document)
            .take_while(|m| m.start() <= offset)
            .find(|m| offset <= m.end())
            .map(|m| m.range())
    }
}

impl Default for SpanClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII letter followed by ASCII letters/digits, at least
/// [`MIN_IDENTIFIER_LEN`] long.
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric())
        && word.len() >= MIN_IDENTIFIER_LEN
}
