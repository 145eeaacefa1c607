//! Reference token scanning
//!
//! Cell references are `[A-Z]+[0-9]+` tokens; JSON paths are `data.a.b`
//! tokens resolved against an attached [`JsonData`](crate::JsonData).

use lazy_regex::regex;

/// All cell reference tokens in `text`, in order, duplicates kept
///
/// ```rust
/// use gridcalc_formula::extract_cell_references;
///
/// assert_eq!(extract_cell_references("=A1+B2*C3"), vec!["A1", "B2", "C3"]);
/// ```
pub fn extract_cell_references(text: &str) -> Vec<String> {
    regex!(r"[A-Z]+[0-9]+")
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// All `data.*` path tokens in `text`, in order, duplicates kept
pub fn extract_json_paths(text: &str) -> Vec<String> {
    regex!(r"\bdata(?:\.[A-Za-z0-9_$]+)+")
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A slice of formula text, either code or a quoted string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Code(&'a str),
    /// Includes its quotes
    Literal(&'a str),
}

/// Split formula text into code and string-literal segments
///
/// Both `"` and `'` open a literal; backslash escapes the next character.
/// An unterminated literal runs to the end of the text.
pub(crate) fn split_literals(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut seg_start = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    segments.push(Segment::Literal(&text[seg_start..=i]));
                    quote = None;
                    seg_start = i + 1;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    if i > seg_start {
                        segments.push(Segment::Code(&text[seg_start..i]));
                    }
                    quote = Some(b);
                    seg_start = i;
                }
            }
        }
        i += 1;
    }

    if seg_start < bytes.len() {
        let rest = &text[seg_start..];
        segments.push(if quote.is_some() {
            Segment::Literal(rest)
        } else {
            Segment::Code(rest)
        });
    }

    segments
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Whether `text[start..end]` is not glued to a neighbouring word character
pub(crate) fn is_whole_token(text: &str, start: usize, end: usize) -> bool {
    !text[..start].chars().next_back().map_or(false, is_word_char)
        && !text[end..].chars().next().map_or(false, is_word_char)
}

/// Reference tokens (cells, then JSON paths) that appear outside string
/// literals as whole tokens, so `A1` inside `xA1` is not one
pub(crate) fn code_references(text: &str, with_json: bool) -> Vec<String> {
    let mut tokens = Vec::new();
    for segment in split_literals(text) {
        if let Segment::Code(code) = segment {
            tokens.extend(
                regex!(r"[A-Z]+[0-9]+")
                    .find_iter(code)
                    .filter(|m| is_whole_token(code, m.start(), m.end()))
                    .map(|m| m.as_str().to_string()),
            );
            if with_json {
                tokens.extend(extract_json_paths(code));
            }
        }
    }
    tokens
}
