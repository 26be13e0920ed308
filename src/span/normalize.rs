//! Comment normalization: strips delimiters and decoration so only the prose
//! inside a comment is sent for translation. Best effort, not reversible.

use std::sync::OnceLock;

use regex::Regex;

struct CommentStripper {
    line_comment: Regex,
    hash_comment: Regex,
    block_open: Regex,
    block_close: Regex,
    line_stars: Regex,
    quotes_open: Regex,
    quotes_close: Regex,
}

impl CommentStripper {
    fn new() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("comment stripper regex is valid");
        Self {
            line_comment: re(r"^//\s*"),
            hash_comment: re(r"^#\s*"),
            block_open: re(r"^/\*\*?\s*"),
            block_close: re(r"\s*\*/\s*$"),
            line_stars: re(r"(?m)^[ \t]*\*[ \t]*"),
            quotes_open: re(r#"^['"]{3}"#),
            quotes_close: re(r#"['"]{3}$"#),
        }
    }

    fn strip(&self, comment: &str) -> String {
        // Star gutters only exist in `/* */` blocks; docstrings keep `*args`.
        let is_block = comment.trim_start().starts_with("/*");
        let text = self.line_comment.replace(comment, "");
        let text = self.hash_comment.replace(&text, "");
        let text = self.block_open.replace(&text, "");
        let text = self.block_close.replace(&text, "");
        let unstarred;
        let text: &str = if is_block {
            unstarred = self.line_stars.replace_all(&text, "");
            &unstarred
        } else {
            &text
        };
        let text = self.quotes_open.replace(text, "");
        let text = self.quotes_close.replace(&text, "");
        text.trim().to_string()
    }
}

fn stripper() -> &'static CommentStripper {
    static STRIPPER: OnceLock<CommentStripper> = OnceLock::new();
    STRIPPER.get_or_init(CommentStripper::new)
}

/// Reduce a raw comment or docstring to the English text inside it.
pub fn extract_english_from_comment(comment: &str) -> String {
    stripper().strip(comment)
}
