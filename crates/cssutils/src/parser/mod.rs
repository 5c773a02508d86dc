//! CSS tokenizing, selector extraction and selector decomposition.
//!
//! This module provides the reading side of the crate:
//!
//! - [`extract_all_selectors`]: Main entry point, one [`SelectorRecord`] per selector
//! - [`tokenizer`]: Line-oriented lexer with a context stack threaded across lines
//! - [`selectors`]: Splits a selector into compound elements and combinators
//! - [`records`]: Positions, records and selector elements
//!
//! ## Example
//!
//! ```rust
//! use cssutils::parser::{extract_all_selectors, Position};
//!
//! let records = extract_all_selectors(".foo { color: red; }");
//! assert_eq!(records[0].selector, ".foo");
//! assert_eq!(records[0].decl_list_start, Some(Position::new(0, 5)));
//! assert_eq!(records[0].decl_list_end, Some(Position::new(0, 20)));
//! ```

pub mod extract;
pub mod records;
pub mod selectors;
pub mod tokenizer;

pub use crate::parser::records::{
    Combinator, ElementKind, Position, SelectorElement, SelectorElements, SelectorRecord,
};
pub use crate::parser::selectors::{decode_escapes, parse_selector_elements};
pub use crate::parser::tokenizer::{
    Dialect, LineTokens, ParseContext, Token, TokenStyle, TokenizerState, tokenize_line,
};

use crate::parser::extract::Extractor;

/// Extracts every selector from a CSS stylesheet, in document order.
pub fn extract_all_selectors(text: &str) -> Vec<SelectorRecord> {
    extract_all_selectors_with_dialect(text, Dialect::Css)
}

/// Extracts every selector using the given dialect's comment rules.
pub fn extract_all_selectors_with_dialect(text: &str, dialect: Dialect) -> Vec<SelectorRecord> {
    let lines = split_lines(text);
    let mut state = TokenizerState::new(dialect);
    let mut extractor = Extractor::new(&lines, dialect);

    for (line_no, line) in lines.iter().enumerate() {
        extractor.begin_line();
        let mut tokens = tokenize_line(line, &mut state);
        while let Some(token) = tokens.next() {
            let context = tokens.state().context();
            extractor.step(line_no, &token, context);
        }
    }

    extractor.finish()
}

/// Splits text on `\r\n`, `\r` and `\n`, keeping a trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}

/// Converts a byte offset within `line` to a char column.
pub(crate) fn char_column(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}

/// Converts a char column within `line` back to a byte offset.
pub(crate) fn byte_offset(line: &str, ch: usize) -> usize {
    line.char_indices().nth(ch).map_or(line.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_all_line_endings() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let line = "é.foo";
        assert_eq!(char_column(line, 2), 1);
        assert_eq!(byte_offset(line, 1), 2);
        assert_eq!(byte_offset(line, 10), line.len());
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(extract_all_selectors("").is_empty());
        assert!(extract_all_selectors_with_dialect("", Dialect::Less).is_empty());
        assert!(extract_all_selectors("   \n\t\n").is_empty());
    }
}
