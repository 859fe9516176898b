//! Word-boundary tokenizer shared by skill matching and similarity scoring.
//!
//! A token is a maximal run of alphanumerics plus `+`, `#` and `.`, with
//! trailing dots dropped. Everything else (whitespace, hyphens, slashes,
//! commas, brackets, quotes) separates tokens. This keeps `c++`, `c#`, `.net`
//! and `node.js` intact while `aws-certified` splits into `aws` + `certified`.
//!
//! Multi-word phrases never span a clause break: line breaks, `, ; : ( ) [ ] ! ?`
//! and a `.` that ends a sentence (followed by whitespace or end of text).

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.')
}

/// Splits text into tokens. Input is expected to be normalized (lowercase).
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !is_token_char(c))
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .collect()
}

fn is_clause_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | ',' | ';' | ':' | '(' | ')' | '[' | ']' | '!' | '?' | '|' | '•'
    )
}

/// Splits raw text into clauses that phrase matching must not cross.
///
/// A dot inside a token (`node.js`, `.net`) is not a break.
pub fn clauses(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let ends_clause = match c {
            '.' => chars.peek().map_or(true, |&(_, next)| next.is_whitespace()),
            other => is_clause_break(other),
        };
        if ends_clause {
            out.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    out.push(&text[start..]);

    out.retain(|clause| !clause.trim().is_empty());
    out
}

/// Canonical phrase form used as a lexicon key: lowercase tokens joined by one space.
pub fn phrase_key(text: &str) -> String {
    let lowered = crate::extraction::normalize(text);
    tokenize(&lowered).join(" ")
}
