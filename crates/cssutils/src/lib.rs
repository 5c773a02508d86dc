//! # cssutils - CSS selector extraction and matching
//!
//! A best-effort, line-oriented CSS reader for editor features such as
//! "go to matching rule" and CSS hints. It never rejects a stylesheet: the
//! tokenizer recovers from anything and the extractor reports whatever
//! selectors it could reconstruct.
//!
//! This crate provides:
//!
//! - **Tokenizing**: a streaming lexer that carries a context stack across lines
//! - **Extraction**: [`SelectorRecord`]s with rule, selector, group and
//!   declaration-list ranges
//! - **Matching**: rightmost-compound matching of a tag, `.class` or `#id` query
//! - **Text helpers**: rule consolidation, named flows, comment/string stripping
//!
//! ## Quick Start
//!
//! ```rust
//! use cssutils::{extract_all_selectors, find_matching_rules};
//!
//! let css = "div .foo { color: red; }\n.bar, .foo { color: blue; }";
//! let records = extract_all_selectors(css);
//! assert_eq!(records.len(), 3);
//!
//! let matches = find_matching_rules(".foo", &records).unwrap();
//! assert_eq!(matches.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: tokenizer, extractor and selector element decomposition
//! - [`matcher`]: selector queries and rule matches
//! - [`text`]: regex and range based helpers over raw stylesheet text
//! - [`error`]: error types for query validation

pub mod error;
pub mod matcher;
pub mod parser;
pub mod text;

pub use error::CssError;
pub use matcher::{RuleMatch, SelectorQuery, expand_parent_references, find_matching_rules};
pub use parser::{
    Combinator, Dialect, ElementKind, Position, SelectorElement, SelectorRecord,
    extract_all_selectors, extract_all_selectors_with_dialect,
};
