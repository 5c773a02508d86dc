//! Error types for selector queries.
//!
//! Extraction itself never fails; malformed stylesheets produce partial
//! records instead. Only the query side can be rejected.

use thiserror::Error;

/// Errors that can occur when validating a selector query.
///
/// # Examples
///
/// ```rust
/// use cssutils::{CssError, SelectorQuery};
///
/// assert!(matches!(SelectorQuery::parse(""), Err(CssError::EmptyQuery)));
/// assert!(SelectorQuery::parse("div .foo").is_err());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssError {
    /// The query was empty or only whitespace.
    #[error("empty selector query")]
    EmptyQuery,

    /// The query is not a single tag, class or id selector.
    ///
    /// Only one simple selector can be searched for; lists and combinators
    /// are not supported.
    #[error("unsupported selector query: {0}")]
    UnsupportedQuery(String),
}
