//! Helpers that work on raw stylesheet text or on lists of matches.

use crate::matcher::RuleMatch;
use crate::parser::{Position, extract_all_selectors};
use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static ESCAPED_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\\"|\\'"#).unwrap());
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*?)"|'(.*?)'"#).unwrap());
static NAMED_FLOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)flow-(into|from):\s*([\w-]+)\s*;").unwrap());

/// Flow names that are keywords or invalid, never reported as named flows.
pub const IGNORED_FLOW_NAMES: [&str; 7] = [
    "content", "element", "none", "inherit", "default", "auto", "initial",
];

/// Removes comments, then strings, so the rest can be scanned with a regex.
///
/// Escaped quotes are dropped first so they cannot unbalance real ones.
pub fn reduce_stylesheet_for_regex_parsing(text: &str) -> String {
    let without_comments = COMMENT.replace_all(text, "");
    let without_escapes = ESCAPED_QUOTE.replace_all(&without_comments, "");
    STRING.replace_all(&without_escapes, "").into_owned()
}

/// Unique `flow-into` / `flow-from` names in order of first appearance.
///
/// ```rust
/// use cssutils::text::extract_all_named_flows;
///
/// let css = "a { flow-into: main; } b { flow-from: main; } c { flow-into: side; }";
/// assert_eq!(extract_all_named_flows(css), vec!["main", "side"]);
/// ```
pub fn extract_all_named_flows(text: &str) -> Vec<String> {
    let reduced = reduce_stylesheet_for_regex_parsing(text);
    let mut names: Vec<String> = Vec::new();
    for caps in NAMED_FLOW.captures_iter(&reduced) {
        let name = &caps[2];
        if IGNORED_FLOW_NAMES.contains(&name) || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}

/// Drops consecutive matches that point at the same rule.
///
/// Two matches are the same rule when source, line range and selector group
/// agree. Every kept match is named after its selector group when it has one.
pub fn consolidate_rules<S: PartialEq>(rules: Vec<RuleMatch<S>>) -> Vec<RuleMatch<S>> {
    let mut out: Vec<RuleMatch<S>> = Vec::with_capacity(rules.len());
    for mut rule in rules {
        if let Some(group) = &rule.selector_group {
            rule.name = group.clone();
        }
        let same_as_last = out.last().is_some_and(|last| {
            last.source == rule.source
                && last.line_start == rule.line_start
                && last.line_end == rule.line_end
                && last.selector_group == rule.selector_group
        });
        if !same_as_last {
            out.push(rule);
        }
    }
    out
}

/// Selector text of the first rule within lines `start_line..=end_line`.
///
/// Returns the whole group when the rule has several selectors, and an
/// empty string when the range holds no rule.
pub fn get_range_selectors(text: &str, start_line: usize, end_line: usize) -> String {
    let slice: Vec<&str> = text
        .split('\n')
        .skip(start_line)
        .take(end_line.saturating_sub(start_line) + 1)
        .collect();
    let records = extract_all_selectors(&slice.join("\n"));
    records
        .first()
        .map(|r| r.group_or_selector().to_string())
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indent {
    Tab,
    Spaces(usize),
}

impl Indent {
    fn render(self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(n),
        }
    }

    fn width(self) -> usize {
        match self {
            Indent::Tab => 1,
            Indent::Spaces(n) => n,
        }
    }
}

/// Where [`add_rule_to_text`] put the new rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertedRule {
    pub from: Position,
    pub to: Position,
    /// The indented blank line inside the new rule.
    pub caret: Position,
}

/// Appends an empty rule for `selector` to the end of `text`.
///
/// The reported range covers the selector line through the closing brace;
/// the blank lines around the rule are not part of it.
pub fn add_rule_to_text(text: &str, selector: &str, indent: Indent) -> (String, InsertedRule) {
    let last_line = text.matches('\n').count();

    let mut out = String::with_capacity(text.len() + selector.len() + 8);
    out.push_str(text);
    out.push('\n');
    out.push_str(selector);
    out.push_str(" {\n");
    out.push_str(&indent.render());
    out.push_str("\n}\n");

    let inserted = InsertedRule {
        from: Position::new(last_line + 1, 0),
        to: Position::new(last_line + 3, 1),
        caret: Position::new(last_line + 2, indent.width()),
    };
    (out, inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str, start: usize, end: usize, group: Option<&str>) -> RuleMatch<String> {
        RuleMatch {
            source: source.to_string(),
            name: "x".to_string(),
            line_start: start,
            line_end: end,
            selector_group: group.map(str::to_string),
        }
    }

    #[test]
    fn test_reduce_strips_comments_and_strings() {
        let css = "a { /* flow-into: x; */ content: \"it\\\"s\"; b: 'q'; }";
        assert_eq!(reduce_stylesheet_for_regex_parsing(css), "a {  content: ; b: ; }");
    }

    #[test]
    fn test_named_flows_ignore_comments_strings_and_reserved() {
        let css = "/* flow-into: hidden; */\n\
                   a { content: 'flow-into: quoted;'; }\n\
                   b { flow-into: content; }\n\
                   c { FLOW-FROM: main ; }\n\
                   d { flow-into: main; }";
        assert_eq!(extract_all_named_flows(css), vec!["main"]);
        assert!(extract_all_named_flows("").is_empty());
    }

    #[test]
    fn test_consolidate_rules() {
        let rules = vec![
            rule("a.css", 0, 2, Some(".a, .b")),
            rule("a.css", 0, 2, Some(".a, .b")),
            rule("b.css", 0, 2, Some(".a, .b")),
            rule("b.css", 4, 5, None),
        ];
        let out = consolidate_rules(rules);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].name, ".a, .b");
        assert_eq!(out[2].name, "x");
    }

    #[test]
    fn test_get_range_selectors() {
        let css = "div { }\n.a,\n.b {\n  color: red;\n}\np { }";
        assert_eq!(get_range_selectors(css, 1, 4), ".a, .b");
        assert_eq!(get_range_selectors(css, 0, 0), "div");
        assert_eq!(get_range_selectors(css, 10, 12), "");
    }

    #[test]
    fn test_add_rule_to_text() {
        let (text, inserted) = add_rule_to_text("a { }\n", ".new", Indent::Spaces(4));
        assert_eq!(text, "a { }\n\n.new {\n    \n}\n");
        assert_eq!(inserted.from, Position::new(2, 0));
        assert_eq!(inserted.to, Position::new(4, 1));
        assert_eq!(inserted.caret, Position::new(3, 4));

        let (text, inserted) = add_rule_to_text("", "div", Indent::Tab);
        assert_eq!(text, "\ndiv {\n\t\n}\n");
        assert_eq!(inserted.caret, Position::new(2, 1));
    }
}
