//! Matching extracted selectors against a simple query.
//!
//! Only the rightmost compound selector is considered: `div .foo` matches
//! `.foo` but not `div`. Type queries are case-insensitive, class and id
//! queries are not. Nested LESS/SCSS selectors that use `&` are matched in
//! their expanded form, so `.btn { &-ok { } }` matches `.btn-ok`.

use crate::error::CssError;
use crate::parser::records::{ElementKind, SelectorElement, SelectorRecord};
use crate::parser::selectors::parse_selector_elements;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// `div`, compared case-insensitively.
    Type,
    /// `.foo`, `#bar` and anything else starting with a selector prefix.
    ClassOrId,
}

/// A validated single simple-selector query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorQuery {
    text: String,
    kind: QueryKind,
}

impl SelectorQuery {
    pub fn parse(query: &str) -> Result<Self, CssError> {
        let query = query.trim();
        let Some(first) = query.chars().next() else {
            return Err(CssError::EmptyQuery);
        };
        if query.contains(|c: char| c.is_whitespace() || matches!(c, ',' | '>' | '+' | '~')) {
            return Err(CssError::UnsupportedQuery(query.to_string()));
        }

        let kind = if matches!(first, '.' | '#' | '[' | ':') || first.is_ascii_digit() {
            QueryKind::ClassOrId
        } else {
            QueryKind::Type
        };
        let text = match kind {
            QueryKind::Type => query.to_lowercase(),
            QueryKind::ClassOrId => query.to_string(),
        };
        Ok(Self { text, kind })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// True if the rightmost compound selector of `record` contains the query.
    pub fn matches(&self, record: &SelectorRecord) -> bool {
        if record.selector.contains('&') && !record.parents.is_empty() {
            return expand_parent_references(&record.parents, &record.selector)
                .iter()
                .any(|selector| self.matches_elements(&parse_selector_elements(selector)));
        }
        self.matches_elements(&record.elements)
    }

    fn matches_elements(&self, elements: &[SelectorElement]) -> bool {
        let Some(last) = elements.last() else {
            return false;
        };

        // A lone `*` stands in for any element.
        if self.kind == QueryKind::Type && elements.len() == 1 && last.kind == ElementKind::Universal
        {
            return true;
        }

        for element in elements.iter().rev() {
            let found = if element.kind == ElementKind::Type {
                element.value.to_lowercase() == self.text
            } else {
                element.value == self.text
            };
            if found {
                return true;
            }
            if !element.combinator.continues_compound() {
                break;
            }
        }
        false
    }
}

/// Expands `selector` against the groups of its enclosing rules, the way a
/// preprocessor writes it out.
///
/// `&` stands for each selector of the parent; a selector without `&` is a
/// descendant of it. At-rule groups such as `@mixin m()` contribute nothing.
///
/// ```rust
/// use cssutils::matcher::expand_parent_references;
///
/// let parents = vec![".a, .b".to_string()];
/// assert_eq!(expand_parent_references(&parents, "&:hover"), vec![".a:hover", ".b:hover"]);
/// assert_eq!(expand_parent_references(&parents, "& + &"), vec![".a + .a", ".b + .b"]);
/// ```
pub fn expand_parent_references(parents: &[String], selector: &str) -> Vec<String> {
    let mut expanded = vec![String::new()];
    for group in parents.iter().map(String::as_str).chain(Some(selector)) {
        let mut next = Vec::new();
        for part in split_group(strip_at_rule(group)) {
            let part = strip_at_rule(part);
            for prefix in &expanded {
                if part.contains('&') {
                    next.push(strip_at_rule(&part.replace('&', prefix)).to_string());
                } else {
                    let mut joined = prefix.clone();
                    if !joined.is_empty() && !part.is_empty() {
                        joined.push(' ');
                    }
                    joined.push_str(part);
                    next.push(joined);
                }
            }
        }
        expanded = next;
    }
    expanded
}

fn strip_at_rule(selector: &str) -> &str {
    let selector = selector.trim();
    if selector.starts_with('@') {
        ""
    } else {
        selector
    }
}

/// Splits a selector group on commas outside parentheses and brackets.
fn split_group(group: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in group.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&group[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&group[start..]);
    parts
}

/// Returns the records whose rightmost compound selector matches `query`.
pub fn find_matching_rules<'r>(
    query: &str,
    records: &'r [SelectorRecord],
) -> Result<Vec<&'r SelectorRecord>, CssError> {
    let query = SelectorQuery::parse(query)?;
    Ok(records.iter().filter(|r| query.matches(r)).collect())
}

/// A matched rule, as handed to navigation and hint features.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMatch<S> {
    pub source: S,
    /// The selector group when known, otherwise the selector, behind the
    /// groups of any enclosing rules (`.nav / > li`).
    pub name: String,
    pub line_start: usize,
    pub line_end: usize,
    pub selector_group: Option<String>,
}

impl<S> RuleMatch<S> {
    /// `line_offset` is added to both lines, for text embedded in a larger document.
    pub fn from_record(source: S, record: &SelectorRecord, line_offset: usize) -> Self {
        let (start, end) = record.line_range();
        let name = match record.parent_selectors() {
            Some(parents) => format!("{parents} / {}", record.group_or_selector()),
            None => record.group_or_selector().to_string(),
        };
        Self {
            source,
            name,
            line_start: start + line_offset,
            line_end: end + line_offset,
            selector_group: record.selector_group.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_all_selectors;

    fn count(css: &str, query: &str) -> usize {
        let records = extract_all_selectors(css);
        find_matching_rules(query, &records).map(|m| m.len()).unwrap_or(0)
    }

    #[test]
    fn test_query_classification() {
        assert_eq!(SelectorQuery::parse("DIV").map(|q| q.kind()), Ok(QueryKind::Type));
        assert_eq!(SelectorQuery::parse("DIV").map(|q| q.as_str().to_string()), Ok("div".into()));
        assert_eq!(SelectorQuery::parse(".Foo").map(|q| q.kind()), Ok(QueryKind::ClassOrId));
        assert_eq!(SelectorQuery::parse("#x").map(|q| q.kind()), Ok(QueryKind::ClassOrId));
        assert_eq!(SelectorQuery::parse("50%").map(|q| q.kind()), Ok(QueryKind::ClassOrId));
    }

    #[test]
    fn test_rejected_queries() {
        assert_eq!(SelectorQuery::parse("  "), Err(CssError::EmptyQuery));
        assert!(matches!(
            SelectorQuery::parse("a, b"),
            Err(CssError::UnsupportedQuery(_))
        ));
        assert!(SelectorQuery::parse("a>b").is_err());
    }

    #[test]
    fn test_rightmost_compound_only() {
        assert_eq!(count("div .foo { }", ".foo"), 1);
        assert_eq!(count("div .foo { }", "div"), 0);
        assert_eq!(count("div.foo { }", "div"), 1);
    }

    #[test]
    fn test_universal() {
        assert_eq!(count("* { }", "span"), 1);
        assert_eq!(count("div * { }", "span"), 0);
        assert_eq!(count("div * { }", "div"), 0);
        assert_eq!(count("*|* { }", "span"), 1);
        assert_eq!(count(".foo * { }", ".foo"), 0);
        assert_eq!(count("*.foo { }", "span"), 0);
    }

    #[test]
    fn test_expand_parent_references() {
        let parents = vec![".grand".to_string(), ".parent".to_string()];
        assert_eq!(
            expand_parent_references(&parents, "& > &"),
            vec![".grand .parent > .grand .parent"]
        );
        assert_eq!(expand_parent_references(&parents, "&&"), vec![".grand .parent.grand .parent"]);
        assert_eq!(expand_parent_references(&parents, ".x &"), vec![".x .grand .parent"]);

        let mixin = vec!["@mixin v($a)".to_string(), ".open &".to_string()];
        assert_eq!(expand_parent_references(&mixin, "&.on"), vec![".open.on"]);

        let group = vec![":is(.a, .b)".to_string()];
        assert_eq!(expand_parent_references(&group, "&-x"), vec![":is(.a, .b)-x"]);
    }

    #[test]
    fn test_rule_match_lines() {
        let records = extract_all_selectors("/* c */\n.a,\n.b {\n}\n");
        let rule = RuleMatch::from_record("inline", &records[1], 10);
        assert_eq!(rule.name, ".a, .b");
        assert_eq!(rule.line_start, 10);
        assert_eq!(rule.line_end, 13);
        assert_eq!(rule.selector_group.as_deref(), Some(".a, .b"));
    }
}
